pub mod attachment;
pub mod context;
pub mod json;
pub mod junit;
pub mod sink;
pub mod types;

use crate::runner::state::{TestRecord, TestSummary};
use anyhow::{Context, Result};
use std::path::Path;
use types::{Status, TestResult, TestResults};

/// Generate a report from saved results.
///
/// `results_path` is either a `test-results.json` written by `run --report`
/// or an Allure results directory.
pub fn generate_report(results_path: &Path, format: &str, output: Option<&Path>) -> Result<()> {
    let test_results = if results_path.is_dir() {
        load_allure_results(results_path)?
    } else {
        let content = std::fs::read_to_string(results_path)
            .with_context(|| format!("Failed to read {}", results_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid results file {}", results_path.display()))?
    };

    match format {
        "json" => json::generate(&test_results, output),
        "junit" => {
            let xml = junit::generate_junit_xml(&test_results)?;
            match output {
                Some(path) => {
                    std::fs::write(path, xml)?;
                    println!("JUnit report saved to: {}", path.display());
                }
                None => println!("{}", xml),
            }
            Ok(())
        }
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}

/// Rebuild session results from the `*-result.json` files of an Allure
/// results directory, ordered by start time.
pub fn load_allure_results(dir: &Path) -> Result<TestResults> {
    let pattern = dir.join("*-result.json");
    let pattern = pattern
        .to_str()
        .context("Results directory path is not valid UTF-8")?;

    let mut results: Vec<TestResult> = Vec::new();
    for path in glob::glob(pattern)?.flatten() {
        let content = std::fs::read_to_string(&path)?;
        match serde_json::from_str::<TestResult>(&content) {
            Ok(result) => results.push(result),
            Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
        }
    }
    results.sort_by_key(|r| r.start);

    let mut summary = TestSummary {
        session_id: dir.display().to_string(),
        total: results.len() as u32,
        ..TestSummary::default()
    };
    let tests: Vec<TestRecord> = results
        .into_iter()
        .map(|r| {
            match r.status {
                Status::Passed => summary.passed += 1,
                Status::Failed => summary.failed += 1,
                Status::Broken => summary.broken += 1,
                Status::Skipped => summary.skipped += 1,
            }
            TestRecord {
                name: r.full_name.rsplit("::").next().unwrap_or(r.full_name.as_str()).to_string(),
                test_id: r.full_name,
                status: r.status,
                duration_ms: Some((r.stop - r.start).max(0) as u64),
                error: r.status_details.trace.or(r.status_details.message),
            }
        })
        .collect();
    summary.total_duration_ms = Some(tests.iter().filter_map(|t| t.duration_ms).sum());

    Ok(TestResults {
        session_id: summary.session_id.clone(),
        tests,
        summary,
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}
