use crate::error::CaseResult;
use crate::runner::context::{Headers, SessionContext};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Blocking HTTP client bound to the session base URL and default headers
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    headers: Headers,
}

/// Fully buffered response of one API call
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub body: String,
    pub elapsed: Duration,
}

impl ApiResponse {
    pub fn json(&self) -> CaseResult<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Body parsed as JSON, or the raw text as a JSON string when it is not
    /// valid JSON. Used for attachments.
    pub fn json_or_text(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|_| Value::String(self.body.clone()))
    }
}

impl ApiClient {
    pub fn new(session: &SessionContext) -> CaseResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: session.resolve_base_url().to_string(),
            headers: session.resolve_default_headers().clone(),
        })
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Join `path` (with or without a leading slash) onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn get(&self, path: &str) -> CaseResult<ApiResponse> {
        self.send(Method::GET, path, None)
    }

    pub fn post(&self, path: &str, body: &Value) -> CaseResult<ApiResponse> {
        self.send(Method::POST, path, Some(body))
    }

    pub fn put(&self, path: &str, body: &Value) -> CaseResult<ApiResponse> {
        self.send(Method::PUT, path, Some(body))
    }

    pub fn delete(&self, path: &str) -> CaseResult<ApiResponse> {
        self.send(Method::DELETE, path, None)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut req = self.client.request(method, url);
        for (k, v) in &self.headers {
            req = req.header(k.as_str(), v.as_str());
        }
        req
    }

    fn send(&self, method: Method, path: &str, body: Option<&Value>) -> CaseResult<ApiResponse> {
        let url = self.url(path);
        let mut req = self.request(method.clone(), &url);
        if let Some(body) = body {
            req = req.body(serde_json::to_string(body)?);
        }

        let started = Instant::now();
        let res = req.send()?;
        let status = res.status().as_u16();
        let body = res.text()?;
        let response = ApiResponse {
            method: method.to_string(),
            url,
            status,
            body,
            elapsed: started.elapsed(),
        };
        log::info!(
            "{} {} -> {} ({}ms)",
            response.method,
            response.url,
            response.status,
            response.elapsed.as_millis()
        );
        Ok(response)
    }
}
