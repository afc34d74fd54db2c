//! Expectation helpers for test bodies. Each returns an assertion failure
//! describing what was expected instead of panicking.

use crate::api::ApiResponse;
use crate::error::{CaseResult, TestFailure};
use serde_json::Value;
use std::fmt::Debug;

pub fn expect_status(response: &ApiResponse, expected: u16) -> CaseResult {
    if response.status == expected {
        return Ok(());
    }
    let mut body = response.body.clone();
    if body.len() > 500 {
        let mut cut = 500;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    Err(TestFailure::assertion(format!(
        "{} {}: expected status {}, got {} after {}ms\nResponse body: {}",
        response.method,
        response.url,
        expected,
        response.status,
        response.elapsed.as_millis(),
        body
    )))
}

pub fn expect_eq<T>(actual: T, expected: T, what: &str) -> CaseResult
where
    T: PartialEq + Debug,
{
    if actual == expected {
        Ok(())
    } else {
        Err(TestFailure::assertion(format!(
            "{}: expected {:?}, got {:?}",
            what, expected, actual
        )))
    }
}

pub fn expect_true(condition: bool, message: &str) -> CaseResult {
    if condition {
        Ok(())
    } else {
        Err(TestFailure::assertion(message))
    }
}

/// `value[key]`, failing when `value` is not an object holding `key`
pub fn expect_key<'v>(value: &'v Value, key: &str) -> CaseResult<&'v Value> {
    value
        .get(key)
        .ok_or_else(|| TestFailure::assertion(format!("expected key '{}' in {}", key, value)))
}

pub fn expect_keys(value: &Value, keys: &[&str]) -> CaseResult {
    for key in keys {
        expect_key(value, key)?;
    }
    Ok(())
}

pub fn expect_str<'v>(value: &'v Value, key: &str) -> CaseResult<&'v str> {
    expect_key(value, key)?
        .as_str()
        .ok_or_else(|| TestFailure::assertion(format!("expected '{}' to be a string", key)))
}

pub fn expect_array<'v>(value: &'v Value, key: &str) -> CaseResult<&'v Vec<Value>> {
    expect_key(value, key)?
        .as_array()
        .ok_or_else(|| TestFailure::assertion(format!("expected '{}' to be an array", key)))
}
