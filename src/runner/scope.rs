use crate::api::{ApiClient, ApiResponse};
use crate::error::CaseResult;
use crate::report::attachment::{self, Attachment};
use crate::report::context::ReportContext;
use crate::report::types::Status;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// What a test body can reach: an HTTP client bound to the session, the
/// report for this test and a per-test token store.
pub struct TestScope<'r, 's> {
    client: ApiClient,
    report: &'r mut ReportContext<'s>,
    /// Auth tokens collected during this test; never shared between tests
    pub tokens: HashMap<String, String>,
}

impl<'r, 's> TestScope<'r, 's> {
    pub fn new(client: ApiClient, report: &'r mut ReportContext<'s>) -> Self {
        Self {
            client,
            report,
            tokens: HashMap::new(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn report(&mut self) -> &mut ReportContext<'s> {
        self.report
    }

    /// Run `f` as a named report step
    pub fn step<T>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> CaseResult<T>) -> CaseResult<T> {
        self.report.start_step(name);
        let result = f(self);
        let status = match &result {
            Ok(_) => Status::Passed,
            Err(e) if e.is_assertion() => Status::Failed,
            Err(_) => Status::Broken,
        };
        self.report.stop_step(status);
        result
    }

    pub fn attach_text(&mut self, name: &str, content: impl Into<String>) {
        self.report.attach(Attachment::text(name, content));
    }

    pub fn attach_json<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) {
        match Attachment::json(name, value) {
            Ok(att) => self.report.attach(att),
            Err(e) => log::warn!("Could not serialize attachment '{}': {}", name, e),
        }
    }

    /// Attach `Status Code: N` under `name`
    pub fn attach_status(&mut self, name: &str, response: &ApiResponse) {
        self.attach_text(name, attachment::status_line(response.status));
    }

    /// Attach the response body as JSON (raw text if it does not parse)
    pub fn attach_body(&mut self, name: &str, response: &ApiResponse) {
        let body = response.json_or_text();
        self.attach_json(name, &body);
    }

    pub fn get(&self, path: &str) -> CaseResult<ApiResponse> {
        self.client.get(path)
    }

    pub fn post(&self, path: &str, body: &Value) -> CaseResult<ApiResponse> {
        self.client.post(path, body)
    }

    pub fn put(&self, path: &str, body: &Value) -> CaseResult<ApiResponse> {
        self.client.put(path, body)
    }

    pub fn delete(&self, path: &str) -> CaseResult<ApiResponse> {
        self.client.delete(path)
    }
}
