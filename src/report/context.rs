use super::attachment::Attachment;
use super::sink::ReportSink;
use super::types::{AttachmentRef, Label, Stage, Status, StatusDetails, StepResult, TestResult};
use sha2::{Digest, Sha256};
use uuid::Uuid;

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Report state for the test currently executing.
///
/// One context is created per test and handed explicitly to the reporting
/// hooks and the test body; nothing about the current test lives in global
/// state. Finishing the context publishes exactly one result to the sink.
pub struct ReportContext<'s> {
    sink: &'s mut dyn ReportSink,
    uuid: String,
    full_name: String,
    name: String,
    title: Option<String>,
    description: Option<String>,
    labels: Vec<Label>,
    start: i64,
    attachments: Vec<AttachmentRef>,
    steps: Vec<StepResult>,
    open_steps: Vec<StepResult>,
}

impl<'s> ReportContext<'s> {
    pub fn new(sink: &'s mut dyn ReportSink, full_name: &str, name: &str) -> Self {
        Self {
            sink,
            uuid: Uuid::new_v4().to_string(),
            full_name: full_name.to_string(),
            name: name.to_string(),
            title: None,
            description: None,
            labels: Vec::new(),
            start: now_millis(),
            attachments: Vec::new(),
            steps: Vec::new(),
            open_steps: Vec::new(),
        }
    }

    /// Display name shown in the report instead of the test name
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn add_labels(&mut self, labels: impl IntoIterator<Item = Label>) {
        self.labels.extend(labels);
    }

    pub fn start_step(&mut self, name: &str) {
        let now = now_millis();
        self.open_steps.push(StepResult {
            name: name.to_string(),
            status: Status::Passed,
            stage: Stage::Running,
            start: now,
            stop: now,
            attachments: Vec::new(),
            steps: Vec::new(),
        });
    }

    /// Close the innermost open step. Ignored when no step is open.
    pub fn stop_step(&mut self, status: Status) {
        let Some(mut step) = self.open_steps.pop() else {
            log::warn!("stop_step called with no open step in '{}'", self.full_name);
            return;
        };
        step.status = status;
        step.stage = Stage::Finished;
        step.stop = now_millis();

        match self.open_steps.last_mut() {
            Some(parent) => parent.steps.push(step),
            None => self.steps.push(step),
        }
    }

    /// Hand an attachment to the sink and record it under the innermost
    /// open step, or on the test itself when no step is open.
    pub fn attach(&mut self, attachment: Attachment) {
        let reference = self.sink.store_attachment(attachment);
        match self.open_steps.last_mut() {
            Some(step) => step.attachments.push(reference),
            None => self.attachments.push(reference),
        }
    }

    /// Close every step still open, innermost first
    pub fn close_open_steps(&mut self, status: Status) {
        while !self.open_steps.is_empty() {
            self.stop_step(status);
        }
    }

    /// Close any dangling steps and publish the result
    pub fn finish(mut self, status: Status, failure: Option<String>) {
        self.close_open_steps(Status::Broken);

        let history_id = format!("{:x}", Sha256::digest(self.full_name.as_bytes()));
        let status_details = StatusDetails {
            message: failure.as_ref().map(|f| first_line(f).to_string()),
            trace: failure,
        };

        let result = TestResult {
            uuid: self.uuid,
            test_case_id: history_id.clone(),
            history_id,
            full_name: self.full_name,
            name: self.title.unwrap_or(self.name),
            description: self.description,
            status,
            status_details,
            stage: Stage::Finished,
            start: self.start,
            stop: now_millis(),
            labels: self.labels,
            steps: self.steps,
            attachments: self.attachments,
        };
        self.sink.publish(result);
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::sink::MemorySink;

    #[test]
    fn test_attachments_land_in_innermost_step() {
        let mut sink = MemorySink::new();
        let mut ctx = ReportContext::new(&mut sink, "suite::test_x", "test_x");
        ctx.attach(Attachment::text("top", "a"));
        ctx.start_step("outer");
        ctx.start_step("inner");
        ctx.attach(Attachment::text("deep", "b"));
        ctx.stop_step(Status::Passed);
        ctx.attach(Attachment::text("middle", "c"));
        ctx.stop_step(Status::Passed);
        ctx.finish(Status::Passed, None);

        let result = &sink.results[0];
        assert_eq!(result.attachments[0].name, "top");
        assert_eq!(result.steps.len(), 1);
        let outer = &result.steps[0];
        assert_eq!(outer.attachments[0].name, "middle");
        assert_eq!(outer.steps[0].name, "inner");
        assert_eq!(outer.steps[0].attachments[0].name, "deep");
        assert_eq!(sink.attachments.len(), 3);
    }

    #[test]
    fn test_finish_uses_title_and_closes_open_steps() {
        let mut sink = MemorySink::new();
        let mut ctx = ReportContext::new(&mut sink, "suite::test_y", "test_y");
        ctx.set_title("Test: test_y");
        ctx.add_labels([Label::new("epic", "ReqRes API")]);
        ctx.start_step("never closed");
        ctx.finish(
            Status::Failed,
            Some("assertion failed: x\nmore detail".to_string()),
        );

        let result = &sink.results[0];
        assert_eq!(result.name, "Test: test_y");
        assert_eq!(result.full_name, "suite::test_y");
        assert_eq!(result.label("epic"), Some("ReqRes API"));
        assert_eq!(result.steps[0].status, Status::Broken);
        assert_eq!(result.status_details.message.as_deref(), Some("assertion failed: x"));
        assert_eq!(result.history_id.len(), 64);
        assert!(result.stop >= result.start);
    }
}
