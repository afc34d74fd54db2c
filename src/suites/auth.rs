use crate::error::CaseResult;
use crate::runner::assertions::{expect_eq, expect_key, expect_str, expect_status, expect_true};
use crate::runner::registry::{Severity, TestCase, TestMetadata};
use crate::runner::scope::TestScope;
use serde_json::json;

const EPIC: &str = "ReqRes API";
const FEATURE: &str = "Authentication";

const EMAIL: &str = "eve.holt@reqres.in";

pub fn cases() -> Vec<TestCase> {
    vec![
        TestCase {
            id: "test_auth_api::TestAuthentication::test_successful_registration",
            meta: TestMetadata {
                epic: EPIC,
                feature: FEATURE,
                story: "User Registration",
                title: "Successful user registration",
                severity: Severity::Blocker,
                tags: &["smoke", "auth"],
            },
            body: successful_registration,
        },
        TestCase {
            id: "test_auth_api::TestAuthentication::test_registration_missing_password",
            meta: TestMetadata {
                epic: EPIC,
                feature: FEATURE,
                story: "User Registration",
                title: "Failed registration with missing password",
                severity: Severity::Critical,
                tags: &[],
            },
            body: registration_missing_password,
        },
        TestCase {
            id: "test_auth_api::TestAuthentication::test_successful_login",
            meta: TestMetadata {
                epic: EPIC,
                feature: FEATURE,
                story: "User Login",
                title: "Successful user login",
                severity: Severity::Blocker,
                tags: &[],
            },
            body: successful_login,
        },
        TestCase {
            id: "test_auth_api::TestAuthentication::test_failed_login",
            meta: TestMetadata {
                epic: EPIC,
                feature: FEATURE,
                story: "User Login",
                title: "Failed login with invalid credentials",
                severity: Severity::Normal,
                tags: &[],
            },
            body: failed_login,
        },
    ]
}

fn successful_registration(t: &mut TestScope<'_, '_>) -> CaseResult {
    let payload = t.step("Prepare registration data", |t| {
        let payload = json!({"email": EMAIL, "password": "pistol"});
        let headers = t.client().headers().clone();
        t.attach_json("Request Payload", &payload);
        t.attach_json("Request Headers", &headers);
        Ok(payload)
    })?;

    let response = t.step("Send POST request to /register", |t| {
        let response = t.post("/register", &payload)?;
        t.attach_status("Response Info", &response);
        if response.status == 200 {
            t.attach_body("Response Body", &response);
        } else {
            t.attach_body("Error Response", &response);
        }
        Ok(response)
    })?;

    t.step("Verify response", |_| {
        expect_status(&response, 200)?;
        let data = response.json()?;
        expect_key(&data, "id")?;
        expect_str(&data, "token").map(|_| ())
    })
}

fn registration_missing_password(t: &mut TestScope<'_, '_>) -> CaseResult {
    let payload = t.step("Prepare invalid registration data", |t| {
        let payload = json!({"email": EMAIL});
        t.attach_json("Request Payload", &payload);
        Ok(payload)
    })?;

    let response = t.step("Send POST request to /register", |t| {
        let response = t.post("/register", &payload)?;
        t.attach_status("Response Info", &response);
        t.attach_body("Error Response", &response);
        Ok(response)
    })?;

    t.step("Verify error response", |_| {
        expect_status(&response, 400)?;
        let data = response.json()?;
        expect_eq(expect_str(&data, "error")?, "Missing password", "error")
    })
}

fn successful_login(t: &mut TestScope<'_, '_>) -> CaseResult {
    let payload = t.step("Prepare login credentials", |t| {
        let payload = json!({"email": EMAIL, "password": "cityslicka"});
        t.attach_json("Login Payload", &payload);
        Ok(payload)
    })?;

    let response = t.step("Send POST request to /login", |t| {
        let response = t.post("/login", &payload)?;
        t.attach_status("Response", &response);
        if response.status == 200 {
            t.attach_body("Login Response", &response);
        }
        Ok(response)
    })?;

    t.step("Verify login response", |t| {
        expect_status(&response, 200)?;
        let data = response.json()?;
        let token = expect_str(&data, "token")?;
        expect_true(!token.is_empty(), "expected a non-empty token")?;
        t.tokens.insert(EMAIL.to_string(), token.to_string());
        Ok(())
    })
}

fn failed_login(t: &mut TestScope<'_, '_>) -> CaseResult {
    let payload = t.step("Prepare invalid credentials", |t| {
        let payload = json!({"email": "nonexistent@reqres.in", "password": "wrongpassword"});
        t.attach_json("Invalid Credentials", &payload);
        Ok(payload)
    })?;

    let response = t.step("Send POST request to /login", |t| {
        let response = t.post("/login", &payload)?;
        t.attach_status("Response Info", &response);
        t.attach_body("Error Response", &response);
        Ok(response)
    })?;

    t.step("Verify error message", |_| {
        expect_status(&response, 400)?;
        expect_key(&response.json()?, "error").map(|_| ())
    })
}
