use thiserror::Error;

/// Why a test phase did not pass.
///
/// Assertion failures are reported as `failed`; everything else (transport,
/// decoding, panics, setup problems) is reported as `broken`.
#[derive(Debug, Error)]
pub enum TestFailure {
    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("test panicked: {0}")]
    Panicked(String),

    #[error("setup failed: {0}")]
    Setup(String),
}

impl TestFailure {
    pub fn assertion(message: impl Into<String>) -> Self {
        TestFailure::Assertion(message.into())
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self, TestFailure::Assertion(_))
    }
}

/// Errors raised while persisting report data. These never fail a test.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type CaseResult<T = ()> = std::result::Result<T, TestFailure>;
