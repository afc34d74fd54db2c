use std::path::PathBuf;

/// Environment variable naming the Allure results directory
pub const RESULTS_DIR_ENV: &str = "ALLURE_RESULTS_DIR";

/// Environment variable overriding the target API base URL
pub const BASE_URL_ENV: &str = "API_BASE_URL";

pub const DEFAULT_RESULTS_DIR: &str = "./allure-results";
pub const DEFAULT_BASE_URL: &str = "https://reqres.in/api";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory receiving Allure result and attachment files
    pub results_dir: PathBuf,

    /// Base URL from `--base-url` or `API_BASE_URL`; `None` uses the default
    pub base_url: Option<String>,

    /// Remove stale result files before the session starts
    pub clean_results: bool,

    /// Stop the session after the first failing test
    pub fail_fast: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            base_url: None,
            clean_results: false,
            fail_fast: false,
        }
    }
}

impl Config {
    /// Defaults overlaid with values from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dir) = lookup(RESULTS_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            config.results_dir = PathBuf::from(dir);
        }
        config.base_url = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty());
        config
    }

    /// Apply command-line flags on top of the environment values
    pub fn with_overrides(mut self, base_url: Option<String>, results_dir: Option<PathBuf>) -> Self {
        if let Some(url) = base_url {
            self.base_url = Some(url);
        }
        if let Some(dir) = results_dir {
            self.results_dir = dir;
        }
        self
    }
}
