use super::state::{Phase, PhaseOutcome};
use crate::report::attachment::{self, Attachment};
use crate::report::context::ReportContext;
use crate::report::types::Status;
use std::time::Instant;

pub const TIMING_ATTACHMENT: &str = "Timing Info";
pub const FAILURE_ATTACHMENT: &str = "Failure Details";

const TIMING_STEP: &str = "Test Timing Information";
const FAILURE_STEP: &str = "Test Failed - Additional Info";

/// Token returned by the pre-hook and consumed by the post-hook
#[derive(Debug)]
pub struct HookStart {
    test_name: String,
    started: Instant,
}

/// Wraps every test with timing and failure diagnostics.
///
/// Both hooks only ever add attachments; they never alter or hide the test
/// outcome, and they cannot fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportingInterceptor;

impl ReportingInterceptor {
    pub fn new() -> Self {
        Self
    }

    /// Record the start instant and title the upcoming test
    pub fn before(&self, test_name: &str, report: &mut ReportContext<'_>) -> HookStart {
        report.set_title(format!("Test: {}", test_name));
        HookStart {
            test_name: test_name.to_string(),
            started: Instant::now(),
        }
    }

    /// Emit "Failure Details" when the call phase failed, then "Timing Info".
    ///
    /// `outcomes` must hold the finalized phase outcomes of the test; only
    /// the call phase is inspected for failures.
    pub fn after(&self, start: HookStart, outcomes: &[PhaseOutcome], report: &mut ReportContext<'_>) {
        let call_failure = outcomes
            .iter()
            .find(|o| o.phase == Phase::Call && o.failed());

        if let Some(outcome) = call_failure {
            let failed_at = chrono::Local::now()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string();
            let error = outcome.failure.as_deref().unwrap_or("unknown error");
            let body = attachment::failure_details(&start.test_name, &failed_at, error);

            report.start_step(FAILURE_STEP);
            report.attach(Attachment::text(FAILURE_ATTACHMENT, body));
            report.stop_step(Status::Passed);
        }

        let elapsed = start.started.elapsed();
        log::debug!("{} finished in {:?}", start.test_name, elapsed);

        report.start_step(TIMING_STEP);
        report.attach(Attachment::text(
            TIMING_ATTACHMENT,
            attachment::timing_info(&start.test_name, elapsed),
        ));
        report.stop_step(Status::Passed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::sink::MemorySink;

    fn run_hooks(sink: &mut MemorySink, outcomes: &[PhaseOutcome]) {
        let interceptor = ReportingInterceptor::new();
        let mut report = ReportContext::new(sink, "suite::test_sample", "test_sample");
        let start = interceptor.before("test_sample", &mut report);
        interceptor.after(start, outcomes, &mut report);
        report.finish(Status::Passed, None);
    }

    fn parse_duration(body: &str) -> f64 {
        body.lines()
            .find_map(|l| l.strip_prefix("Duration: "))
            .and_then(|d| d.strip_suffix('s'))
            .and_then(|d| d.parse().ok())
            .expect("duration line")
    }

    #[test]
    fn test_passing_test_gets_timing_only() {
        let mut sink = MemorySink::new();
        let outcomes = [
            PhaseOutcome::passed("t", Phase::Setup),
            PhaseOutcome::passed("t", Phase::Call),
            PhaseOutcome::passed("t", Phase::Teardown),
        ];
        run_hooks(&mut sink, &outcomes);

        let timing = sink.attachments_named(TIMING_ATTACHMENT);
        assert_eq!(timing.len(), 1);
        let body = timing[0].content_str();
        assert!(body.starts_with("Test: test_sample\n"));
        assert!(parse_duration(&body) >= 0.0);
        assert!(sink.attachments_named(FAILURE_ATTACHMENT).is_empty());

        assert_eq!(sink.results[0].name, "Test: test_sample");
        let step = &sink.results[0].steps[0];
        assert_eq!(step.name, "Test Timing Information");
    }

    #[test]
    fn test_call_failure_emits_details_before_timing() {
        let mut sink = MemorySink::new();
        let outcomes = [
            PhaseOutcome::passed("t", Phase::Setup),
            PhaseOutcome {
                test_id: "t".to_string(),
                phase: Phase::Call,
                status: Status::Failed,
                failure: Some("assertion failed: status code: expected 200, got 500".to_string()),
            },
            PhaseOutcome::passed("t", Phase::Teardown),
        ];
        run_hooks(&mut sink, &outcomes);

        let names: Vec<&str> = sink.attachments.iter().map(|(r, _)| r.name.as_str()).collect();
        assert_eq!(names, vec![FAILURE_ATTACHMENT, TIMING_ATTACHMENT]);

        let details = sink.attachments_named(FAILURE_ATTACHMENT);
        let details = details[0].content_str();
        assert!(details.starts_with("Test: test_sample\nFailed at: "));
        assert!(details.ends_with("Error: assertion failed: status code: expected 200, got 500"));

        let steps = &sink.results[0].steps;
        assert_eq!(steps[0].name, "Test Failed - Additional Info");
        assert_eq!(steps[1].name, "Test Timing Information");
    }

    #[test]
    fn test_setup_failure_is_not_reported_as_failure_details() {
        let mut sink = MemorySink::new();
        let outcomes = [PhaseOutcome {
            test_id: "t".to_string(),
            phase: Phase::Setup,
            status: Status::Broken,
            failure: Some("setup failed: no client".to_string()),
        }];
        run_hooks(&mut sink, &outcomes);

        assert!(sink.attachments_named(FAILURE_ATTACHMENT).is_empty());
        assert_eq!(sink.attachments_named(TIMING_ATTACHMENT).len(), 1);
    }

    #[test]
    fn test_broken_call_counts_as_failure() {
        let mut sink = MemorySink::new();
        let outcomes = [PhaseOutcome {
            test_id: "t".to_string(),
            phase: Phase::Call,
            status: Status::Broken,
            failure: Some("request failed: connection refused".to_string()),
        }];
        run_hooks(&mut sink, &outcomes);

        let details = sink.attachments_named(FAILURE_ATTACHMENT);
        assert_eq!(details.len(), 1);
        assert!(details[0].content_str().contains("connection refused"));
    }
}
