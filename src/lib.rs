pub mod api;
pub mod error;
pub mod report;
pub mod runner;
pub mod suites;
pub mod utils;

// Re-export common items
pub use error::{CaseResult, TestFailure};
pub use report::generate_report;
pub use runner::{run_tests, RunOptions};
