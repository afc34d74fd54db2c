use crate::error::CaseResult;
use crate::runner::assertions::{expect_array, expect_eq, expect_key, expect_keys, expect_status};
use crate::runner::registry::{Severity, TestCase, TestMetadata};
use crate::runner::scope::TestScope;
use serde_json::{json, Value};

const EPIC: &str = "ReqRes API";
const FEATURE: &str = "User Management";

pub fn cases() -> Vec<TestCase> {
    let meta = |story: &'static str,
                title: &'static str,
                severity: Severity,
                tags: &'static [&'static str]| TestMetadata {
        epic: EPIC,
        feature: FEATURE,
        story,
        title,
        severity,
        tags,
    };

    vec![
        TestCase {
            id: "test_users_api::TestUsersAPI::test_get_users_list",
            meta: meta("Get Users", "Get list of users", Severity::Critical, &["smoke", "users"]),
            body: get_users_list,
        },
        TestCase {
            id: "test_users_api::TestUsersAPI::test_get_single_user",
            meta: meta("Get Single User", "Get user by ID", Severity::Normal, &[]),
            body: get_single_user,
        },
        TestCase {
            id: "test_users_api::TestUsersAPI::test_get_nonexistent_user",
            meta: meta("Get Single User", "Get non-existent user", Severity::Minor, &[]),
            body: get_nonexistent_user,
        },
        TestCase {
            id: "test_users_api::TestUsersAPI::test_create_user",
            meta: meta("Create User", "Create new user", Severity::Critical, &[]),
            body: create_user,
        },
        TestCase {
            id: "test_users_api::TestUsersAPI::test_update_user",
            meta: meta("Update User", "Update user information", Severity::Normal, &[]),
            body: update_user,
        },
        TestCase {
            id: "test_users_api::TestUsersAPI::test_delete_user",
            meta: meta("Delete User", "Delete user", Severity::Critical, &[]),
            body: delete_user,
        },
    ]
}

fn get_users_list(t: &mut TestScope<'_, '_>) -> CaseResult {
    let response = t.step("Send GET request to /users", |t| {
        let response = t.get("/users?page=2")?;
        t.attach_status("Response Info", &response);
        t.attach_body("Response Body", &response);
        Ok(response)
    })?;

    let data = t.step("Verify response structure", |_| {
        expect_status(&response, 200)?;
        let data = response.json()?;
        expect_keys(&data, &["page", "per_page", "total", "data"])?;
        expect_array(&data, "data")?;
        Ok(data)
    })?;

    t.step("Verify user data format", |_| {
        if let Some(user) = expect_array(&data, "data")?.first() {
            expect_keys(user, &["id", "email", "first_name", "last_name", "avatar"])?;
        }
        Ok(())
    })
}

fn get_single_user(t: &mut TestScope<'_, '_>) -> CaseResult {
    let user_id = 2;

    let response = t.step(&format!("Send GET request to /users/{}", user_id), |t| {
        let response = t.get(&format!("/users/{}", user_id))?;
        t.attach_body("User Data", &response);
        Ok(response)
    })?;

    t.step("Verify user details", |_| {
        expect_status(&response, 200)?;
        let body = response.json()?;
        let data = expect_key(&body, "data")?;
        expect_eq(data["id"].as_i64(), Some(user_id), "data.id")?;
        expect_eq(data["email"].as_str(), Some("janet.weaver@reqres.in"), "data.email")?;
        expect_eq(data["first_name"].as_str(), Some("Janet"), "data.first_name")?;
        expect_eq(data["last_name"].as_str(), Some("Weaver"), "data.last_name")
    })
}

fn get_nonexistent_user(t: &mut TestScope<'_, '_>) -> CaseResult {
    let response = t.step("Send GET request for non-existent user", |t| {
        let response = t.get("/users/23")?;
        t.attach_status("Response", &response);
        Ok(response)
    })?;

    t.step("Verify 404 response", |_| {
        expect_status(&response, 404)?;
        expect_eq(response.json()?, json!({}), "response body")
    })
}

fn create_user(t: &mut TestScope<'_, '_>) -> CaseResult {
    let payload = t.step("Prepare user data", |t| {
        let payload = json!({"name": "morpheus", "job": "leader"});
        t.attach_json("Request Payload", &payload);
        Ok(payload)
    })?;

    let response = t.step("Send POST request to /users", |t| {
        let response = t.post("/users", &payload)?;
        t.attach_body("Response", &response);
        Ok(response)
    })?;

    t.step("Verify user creation", |_| {
        expect_status(&response, 201)?;
        let data = response.json()?;
        expect_echoed(&data, &payload)?;
        expect_keys(&data, &["id", "createdAt"])
    })
}

fn update_user(t: &mut TestScope<'_, '_>) -> CaseResult {
    let user_id = 2;

    let payload = t.step("Prepare update data", |t| {
        let payload = json!({"name": "morpheus", "job": "zion resident"});
        t.attach_json("Update Payload", &payload);
        Ok(payload)
    })?;

    let response = t.step(&format!("Send PUT request to /users/{}", user_id), |t| {
        let response = t.put(&format!("/users/{}", user_id), &payload)?;
        t.attach_body("Update Response", &response);
        Ok(response)
    })?;

    t.step("Verify update response", |_| {
        expect_status(&response, 200)?;
        let data = response.json()?;
        expect_echoed(&data, &payload)?;
        expect_key(&data, "updatedAt").map(|_| ())
    })
}

fn delete_user(t: &mut TestScope<'_, '_>) -> CaseResult {
    let user_id = 2;

    let response = t.step(&format!("Send DELETE request to /users/{}", user_id), |t| {
        let response = t.delete(&format!("/users/{}", user_id))?;
        t.attach_status("Delete Response", &response);
        Ok(response)
    })?;

    t.step("Verify deletion success", |_| {
        expect_status(&response, 204)?;
        expect_eq(response.body.as_str(), "", "response body")
    })
}

/// `name` and `job` in the response match the request payload
fn expect_echoed(data: &Value, payload: &Value) -> CaseResult {
    for key in ["name", "job"] {
        expect_eq(data.get(key), payload.get(key), key)?;
    }
    Ok(())
}
