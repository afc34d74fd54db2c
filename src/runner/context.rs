use crate::utils::config::{BASE_URL_ENV, DEFAULT_BASE_URL};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Header mapping sent with every request
pub type Headers = HashMap<String, String>;

const API_KEY_HEADER: &str = "x-api-key";
const API_KEY: &str = "reqres-free-v1";

/// Session-wide configuration shared by every test of a run.
///
/// Values are resolved lazily on first access and then frozen, so every test
/// in the session observes the same base URL and headers even if the
/// environment changes mid-run.
#[derive(Debug, Default)]
pub struct SessionContext {
    /// Explicit values consulted before the process environment
    overrides: HashMap<String, String>,
    base_url: OnceLock<String>,
    headers: OnceLock<Headers>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context whose base URL is pinned, ignoring `API_BASE_URL`
    pub fn with_base_url(url: impl Into<String>) -> Self {
        let mut ctx = Self::new();
        ctx.set_override(BASE_URL_ENV, url);
        ctx
    }

    /// Set a lookup override. Has no effect once the value was resolved.
    pub fn set_override(&mut self, name: &str, value: impl Into<String>) {
        self.overrides.insert(name.to_string(), value.into());
    }

    /// Target API base URL, without a trailing slash
    pub fn resolve_base_url(&self) -> &str {
        self.base_url.get_or_init(|| {
            let url = self
                .get_var(BASE_URL_ENV)
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
            log::debug!("Resolved API base URL: {}", url);
            url
        })
    }

    /// Authentication and content-type headers
    pub fn resolve_default_headers(&self) -> &Headers {
        self.headers.get_or_init(|| {
            let mut headers = Headers::new();
            headers.insert(API_KEY_HEADER.to_string(), API_KEY.to_string());
            headers.insert("Content-Type".to_string(), "application/json".to_string());
            headers
        })
    }

    /// Properties describing the session, written next to the report results
    pub fn environment(&self) -> Vec<(String, String)> {
        vec![
            ("API_BASE_URL".to_string(), self.resolve_base_url().to_string()),
            (
                "API_KEY_HEADER".to_string(),
                API_KEY_HEADER.to_string(),
            ),
        ]
    }

    fn get_var(&self, name: &str) -> Option<String> {
        self.overrides
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_override_wins() {
        let ctx = SessionContext::with_base_url("http://localhost:8080/api/");
        assert_eq!(ctx.resolve_base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn test_blank_override_falls_back_to_default() {
        let ctx = SessionContext::with_base_url("   ");
        assert_eq!(ctx.resolve_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    #[serial]
    fn test_env_override_and_memoization() {
        std::env::set_var(BASE_URL_ENV, "http://staging.local/api");
        let ctx = SessionContext::new();
        assert_eq!(ctx.resolve_base_url(), "http://staging.local/api");

        // Later environment changes are not observed within the session
        std::env::set_var(BASE_URL_ENV, "http://other.local/api");
        assert_eq!(ctx.resolve_base_url(), "http://staging.local/api");

        std::env::remove_var(BASE_URL_ENV);
        assert_eq!(ctx.resolve_base_url(), "http://staging.local/api");
    }

    #[test]
    #[serial]
    fn test_env_value_is_normalised() {
        // Surrounding whitespace and a trailing slash are dropped so paths
        // can be joined with a single '/'
        std::env::set_var(BASE_URL_ENV, "  http://staging.local/api/ ");
        let ctx = SessionContext::new();
        assert_eq!(ctx.resolve_base_url(), "http://staging.local/api");
        std::env::remove_var(BASE_URL_ENV);
    }

    #[test]
    #[serial]
    fn test_blank_env_falls_back_to_default() {
        std::env::set_var(BASE_URL_ENV, "   ");
        let ctx = SessionContext::new();
        assert_eq!(ctx.resolve_base_url(), DEFAULT_BASE_URL);
        std::env::remove_var(BASE_URL_ENV);
    }

    #[test]
    #[serial]
    fn test_default_when_unset() {
        std::env::remove_var(BASE_URL_ENV);
        let ctx = SessionContext::new();
        assert_eq!(ctx.resolve_base_url(), "https://reqres.in/api");
    }

    #[test]
    fn test_default_headers() {
        let ctx = SessionContext::new();
        let headers = ctx.resolve_default_headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("x-api-key").map(String::as_str), Some("reqres-free-v1"));
        assert_eq!(
            headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert!(std::ptr::eq(headers, ctx.resolve_default_headers()));
    }
}
