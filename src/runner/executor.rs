use anyhow::Result;
use colored::Colorize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use super::context::SessionContext;
use super::events::{EventEmitter, EventListener, TestEvent};
use super::interceptor::ReportingInterceptor;
use super::registry::{TestBody, TestCase};
use super::scope::TestScope;
use super::state::{overall_status, Phase, PhaseOutcome, TestRecord, TestSessionState, TestSummary};
use crate::api::ApiClient;
use crate::error::{CaseResult, TestFailure};
use crate::report::context::ReportContext;
use crate::report::sink::ReportSink;
use crate::report::types::{Status, TestResults};

/// Sequential test runner.
///
/// Runs one test at a time through setup, call and teardown, wrapping each
/// in the reporting hooks and publishing its result to the sink.
pub struct TestExecutor<S: ReportSink> {
    session_ctx: SessionContext,
    sink: S,
    interceptor: ReportingInterceptor,
    emitter: EventEmitter,
    state: TestSessionState,
    fail_fast: bool,
    stop_flag: Arc<AtomicBool>,
}

impl<S: ReportSink> TestExecutor<S> {
    pub fn new(session_ctx: SessionContext, sink: S, fail_fast: bool) -> Self {
        Self {
            session_ctx,
            sink,
            interceptor: ReportingInterceptor::new(),
            emitter: EventEmitter::new(),
            state: TestSessionState::new(&Uuid::new_v4().to_string()),
            fail_fast,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribe to test execution events
    pub fn subscribe(&mut self, listener: Box<dyn EventListener>) {
        self.emitter.subscribe(listener);
    }

    /// Flag that, once set, stops the session before the next test
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run the given cases in order and return the session summary
    pub fn run(&mut self, cases: &[&TestCase]) -> TestSummary {
        self.state.start();
        self.sink.write_environment(&self.session_ctx.environment());
        self.emitter.emit(TestEvent::SessionStarted {
            session_id: self.state.session_id.clone(),
            base_url: self.session_ctx.resolve_base_url().to_string(),
            total: cases.len(),
        });

        for case in cases {
            if self.stop_flag.load(Ordering::SeqCst) {
                self.emitter.emit(TestEvent::Log {
                    message: format!("{} Interrupted, skipping remaining tests", "⚠".yellow()),
                });
                break;
            }

            let record = self.run_case(case);
            let failed = record.status != Status::Passed;
            self.state.add_test(record);

            if failed && self.fail_fast {
                self.emitter.emit(TestEvent::Log {
                    message: format!("{} Stopping after first failure", "ℹ".blue()),
                });
                break;
            }
        }

        self.finish()
    }

    fn run_case(&mut self, case: &TestCase) -> TestRecord {
        let name = case.name();
        self.emitter.emit(TestEvent::TestStarted {
            test_id: case.id.to_string(),
            title: case.meta.title.to_string(),
        });
        log::debug!("Running {}", case.id);

        let started = Instant::now();
        let mut outcomes: Vec<PhaseOutcome> = Vec::with_capacity(3);

        let mut report = ReportContext::new(&mut self.sink, case.id, name);
        report.add_labels(case.labels());
        report.set_description(case.meta.title);
        let hook = self.interceptor.before(name, &mut report);

        // Setup: resolve the per-test fixtures
        match ApiClient::new(&self.session_ctx) {
            Err(e) => {
                let failure = TestFailure::Setup(e.to_string());
                log::error!("{}: {}", case.id, failure);
                outcomes.push(PhaseOutcome::from_failure(case.id, Phase::Setup, &failure));
            }
            Ok(client) => {
                outcomes.push(PhaseOutcome::passed(case.id, Phase::Setup));

                let mut scope = TestScope::new(client, &mut report);
                let result = run_body(case.body, &mut scope);
                let status = match &result {
                    Ok(()) => Status::Passed,
                    Err(e) if e.is_assertion() => Status::Failed,
                    Err(_) => Status::Broken,
                };
                scope.report().close_open_steps(status);
                outcomes.push(PhaseOutcome::from_result(case.id, Phase::Call, &result));

                // Teardown: per-test state goes away with the scope
                if !scope.tokens.is_empty() {
                    log::trace!("Discarding {} token(s) from {}", scope.tokens.len(), case.id);
                }
                let teardown = run_teardown(move || drop(scope));
                if let Err(e) = &teardown {
                    log::error!("{}: teardown {}", case.id, e);
                }
                outcomes.push(PhaseOutcome::from_result(case.id, Phase::Teardown, &teardown));
            }
        }

        self.interceptor.after(hook, &outcomes, &mut report);

        let (status, error) = overall_status(&outcomes);
        report.finish(status, error.clone());

        let duration_ms = started.elapsed().as_millis() as u64;
        self.emitter.emit(TestEvent::TestFinished {
            test_id: case.id.to_string(),
            status,
            duration_ms,
            error: error.clone(),
        });

        TestRecord {
            test_id: case.id.to_string(),
            name: name.to_string(),
            status,
            duration_ms: Some(duration_ms),
            error,
        }
    }

    /// Finish the test session and return its summary
    pub fn finish(&mut self) -> TestSummary {
        self.state.finish();
        let summary = self.state.summary();
        self.emitter.emit(TestEvent::SessionFinished {
            summary: summary.clone(),
        });
        summary
    }

    /// Save `test-results.json` and `junit.xml` under `output_dir`
    pub fn write_reports(&self, output_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(output_dir)?;

        let report_data = self.state.to_report();
        let test_results = TestResults {
            session_id: report_data.session_id,
            tests: report_data.tests,
            summary: report_data.summary,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        let report_path = output_dir.join("test-results.json");
        crate::report::json::generate(&test_results, Some(&report_path))?;
        crate::report::junit::write_report(&test_results, output_dir)?;

        Ok(())
    }
}

/// Call phase: run the body, turning a panic into a broken outcome
fn run_body(body: TestBody, scope: &mut TestScope<'_, '_>) -> CaseResult {
    match panic::catch_unwind(AssertUnwindSafe(|| body(scope))) {
        Ok(result) => result,
        Err(payload) => Err(TestFailure::Panicked(panic_message(payload.as_ref()))),
    }
}

/// Teardown phase: release per-test state. A panic while releasing it
/// fails the phase instead of aborting the session.
fn run_teardown(release: impl FnOnce()) -> CaseResult {
    panic::catch_unwind(AssertUnwindSafe(release))
        .map_err(|payload| TestFailure::Panicked(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
