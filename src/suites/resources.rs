use crate::error::CaseResult;
use crate::runner::assertions::{expect_array, expect_eq, expect_key, expect_keys, expect_status};
use crate::runner::registry::{Severity, TestCase, TestMetadata};
use crate::runner::scope::TestScope;

const EPIC: &str = "ReqRes API";
const FEATURE: &str = "Resources Management";

pub fn cases() -> Vec<TestCase> {
    vec![
        TestCase {
            id: "test_resources_api::TestResourcesAPI::test_get_resources_list",
            meta: TestMetadata {
                epic: EPIC,
                feature: FEATURE,
                story: "Get Resources",
                title: "Get list of resources",
                severity: Severity::Normal,
                tags: &[],
            },
            body: get_resources_list,
        },
        TestCase {
            id: "test_resources_api::TestResourcesAPI::test_get_single_resource",
            meta: TestMetadata {
                epic: EPIC,
                feature: FEATURE,
                story: "Get Single Resource",
                title: "Get resource by ID",
                severity: Severity::Minor,
                tags: &[],
            },
            body: get_single_resource,
        },
    ]
}

fn get_resources_list(t: &mut TestScope<'_, '_>) -> CaseResult {
    let response = t.step("Send GET request to /unknown", |t| {
        let response = t.get("/unknown")?;
        t.attach_body("Resources List", &response);
        Ok(response)
    })?;

    t.step("Verify resources data", |_| {
        expect_status(&response, 200)?;
        let data = response.json()?;
        expect_keys(&data, &["page", "per_page", "total", "data"])?;
        if let Some(resource) = expect_array(&data, "data")?.first() {
            expect_keys(resource, &["id", "name", "year", "color", "pantone_value"])?;
        }
        Ok(())
    })
}

fn get_single_resource(t: &mut TestScope<'_, '_>) -> CaseResult {
    let resource_id = 2;

    let response = t.step(&format!("Send GET request to /unknown/{}", resource_id), |t| {
        let response = t.get(&format!("/unknown/{}", resource_id))?;
        t.attach_body("Resource Details", &response);
        Ok(response)
    })?;

    t.step("Verify resource details", |_| {
        expect_status(&response, 200)?;
        let body = response.json()?;
        let data = expect_key(&body, "data")?;
        expect_eq(data["id"].as_i64(), Some(resource_id), "data.id")?;
        expect_eq(data["name"].as_str(), Some("fuchsia rose"), "data.name")?;
        expect_eq(data["year"].as_i64(), Some(2001), "data.year")?;
        expect_eq(data["color"].as_str(), Some("#C74375"), "data.color")?;
        expect_eq(data["pantone_value"].as_str(), Some("17-2031"), "data.pantone_value")
    })
}
