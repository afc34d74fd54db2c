use crate::error::TestFailure;
use crate::report::types::Status;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Lifecycle phase of a single test
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Call,
    Teardown,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Setup => "setup",
            Phase::Call => "call",
            Phase::Teardown => "teardown",
        };
        f.write_str(s)
    }
}

/// Outcome of one phase of one test, produced by the executor
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseOutcome {
    pub test_id: String,
    pub phase: Phase,
    pub status: Status,
    pub failure: Option<String>,
}

impl PhaseOutcome {
    pub fn passed(test_id: &str, phase: Phase) -> Self {
        Self {
            test_id: test_id.to_string(),
            phase,
            status: Status::Passed,
            failure: None,
        }
    }

    pub fn from_failure(test_id: &str, phase: Phase, failure: &TestFailure) -> Self {
        let status = if failure.is_assertion() {
            Status::Failed
        } else {
            Status::Broken
        };
        Self {
            test_id: test_id.to_string(),
            phase,
            status,
            failure: Some(failure.to_string()),
        }
    }

    pub fn from_result(test_id: &str, phase: Phase, result: &Result<(), TestFailure>) -> Self {
        match result {
            Ok(()) => Self::passed(test_id, phase),
            Err(e) => Self::from_failure(test_id, phase, e),
        }
    }

    pub fn failed(&self) -> bool {
        self.status != Status::Passed
    }
}

/// Overall status of a test derived from its phase outcomes.
///
/// A failing setup marks the test broken; otherwise the call phase decides,
/// and a teardown problem only surfaces when the call passed.
pub fn overall_status(outcomes: &[PhaseOutcome]) -> (Status, Option<String>) {
    let find = |phase| outcomes.iter().find(|o| o.phase == phase);

    if let Some(setup) = find(Phase::Setup).filter(|o| o.failed()) {
        return (Status::Broken, setup.failure.clone());
    }
    match find(Phase::Call) {
        Some(call) if call.failed() => (call.status, call.failure.clone()),
        Some(_) => match find(Phase::Teardown).filter(|o| o.failed()) {
            Some(td) => (Status::Broken, td.failure.clone()),
            None => (Status::Passed, None),
        },
        None => (Status::Skipped, None),
    }
}

/// Per-test record kept for the session report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    pub test_id: String,
    pub name: String,
    pub status: Status,
    pub duration_ms: Option<u64>,
    pub error: Option<String>,
}

/// Global test session state
#[derive(Debug, Clone)]
pub struct TestSessionState {
    pub session_id: String,
    pub tests: Vec<TestRecord>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl TestSessionState {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            tests: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn add_test(&mut self, record: TestRecord) {
        self.tests.push(record);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn summary(&self) -> TestSummary {
        let mut summary = TestSummary {
            session_id: self.session_id.clone(),
            total: self.tests.len() as u32,
            ..TestSummary::default()
        };

        for test in &self.tests {
            match test.status {
                Status::Passed => summary.passed += 1,
                Status::Failed => summary.failed += 1,
                Status::Broken => summary.broken += 1,
                Status::Skipped => summary.skipped += 1,
            }
        }

        summary.total_duration_ms = self.started_at.map(|start| {
            self.finished_at
                .unwrap_or_else(Instant::now)
                .duration_since(start)
                .as_millis() as u64
        });

        summary
    }

    /// Serialize state for reporting
    pub fn to_report(&self) -> TestSessionReport {
        TestSessionReport {
            session_id: self.session_id.clone(),
            tests: self.tests.clone(),
            summary: self.summary(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub session_id: String,
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub broken: u32,
    pub skipped: u32,
    pub total_duration_ms: Option<u64>,
}

impl TestSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.broken == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSessionReport {
    pub session_id: String,
    pub tests: Vec<TestRecord>,
    pub summary: TestSummary,
}
