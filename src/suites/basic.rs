use crate::error::CaseResult;
use crate::runner::assertions::{expect_key, expect_status};
use crate::runner::registry::{Severity, TestCase, TestMetadata};
use crate::runner::scope::TestScope;

pub fn cases() -> Vec<TestCase> {
    vec![TestCase {
        id: "test_api::TestBasicAPI::test_get_request",
        meta: TestMetadata {
            epic: "ReqRes API",
            feature: "Basic API Tests",
            story: "API Health Check",
            title: "Test API is accessible",
            severity: Severity::Blocker,
            tags: &["smoke"],
        },
        body: get_request,
    }]
}

fn get_request(t: &mut TestScope<'_, '_>) -> CaseResult {
    let response = t.step("Send simple GET request", |t| t.get("/users/1"))?;

    t.step("Verify API response", |_| {
        expect_status(&response, 200)?;
        expect_key(&response.json()?, "data").map(|_| ())
    })
}
