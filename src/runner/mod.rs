pub mod assertions;
pub mod context;
pub mod events;
pub mod executor;
pub mod interceptor;
pub mod registry;
pub mod scope;
pub mod state;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use crate::report::sink::{AllureSink, MemorySink, ReportSink};
use crate::utils::config::Config;

pub use context::SessionContext;
pub use events::*;
pub use executor::TestExecutor;
pub use interceptor::ReportingInterceptor;
pub use registry::{Severity, TestCase, TestMetadata};
pub use scope::TestScope;
pub use state::*;

/// Options of a single `run` invocation
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Every listed tag must be present on a case
    pub tags: Option<Vec<String>>,
    /// Substring matched against case identifiers
    pub name: Option<String>,
    /// Write `test-results.json` and `junit.xml` to `output`
    pub report: bool,
    pub output: PathBuf,
    /// Keep results in memory instead of writing Allure files
    pub no_allure: bool,
}

/// Session context for a run. A configured base URL is pinned so it wins
/// over whatever `API_BASE_URL` holds when the session resolves it.
pub fn session_context(config: &Config) -> SessionContext {
    match &config.base_url {
        Some(url) => SessionContext::with_base_url(url.clone()),
        None => SessionContext::new(),
    }
}

/// Run the registered suites against the configured API
pub fn run_tests(config: &Config, options: &RunOptions) -> Result<TestSummary> {
    let cases = crate::suites::registry();
    let selected = registry::select(&cases, options.tags.as_deref(), options.name.as_deref());
    if selected.is_empty() {
        println!("{} No tests matched the given filters.", "ℹ".blue());
        return Ok(TestSummary::default());
    }

    let session = session_context(config);

    let sink: Box<dyn ReportSink> = if options.no_allure {
        Box::new(MemorySink::new())
    } else {
        let sink = AllureSink::new(&config.results_dir, config.clean_results).with_context(|| {
            format!("Failed to prepare results directory {}", config.results_dir.display())
        })?;
        Box::new(sink)
    };

    let mut executor = TestExecutor::new(session, sink, config.fail_fast);
    executor.subscribe(Box::new(ConsoleEventListener::new()));

    let stop_flag = executor.stop_flag();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("\n{} Stopping after the current test...", "⏹".yellow());
        stop_flag.store(true, Ordering::SeqCst);
    }) {
        log::warn!("Could not install Ctrl+C handler: {}", e);
    }

    let summary = executor.run(&selected);

    if options.report {
        executor
            .write_reports(&options.output)
            .with_context(|| format!("Failed to write reports to {}", options.output.display()))?;
    }

    Ok(summary)
}
