use serde::Serialize;

/// Content type of an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentType {
    Text,
    Json,
}

impl AttachmentType {
    pub fn mime(&self) -> &'static str {
        match self {
            AttachmentType::Text => "text/plain",
            AttachmentType::Json => "application/json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AttachmentType::Text => "txt",
            AttachmentType::Json => "json",
        }
    }
}

/// A named diagnostic blob handed to a report sink
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub kind: AttachmentType,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttachmentType::Text,
            content: content.into().into_bytes(),
        }
    }

    /// Pretty-printed JSON attachment (two-space indent)
    pub fn json<T: Serialize + ?Sized>(
        name: impl Into<String>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            name: name.into(),
            kind: AttachmentType::Json,
            content: serde_json::to_vec_pretty(value)?,
        })
    }

    pub fn content_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Body of the "Timing Info" attachment
pub fn timing_info(test_name: &str, elapsed: std::time::Duration) -> String {
    format!(
        "Test: {}\nDuration: {:.2}s",
        test_name,
        elapsed.as_secs_f64()
    )
}

/// Body of the "Failure Details" attachment
pub fn failure_details(test_name: &str, failed_at: &str, error: &str) -> String {
    format!(
        "Test: {}\nFailed at: {}\nError: {}",
        test_name, failed_at, error
    )
}

/// Body of the "Response Info" style attachments
pub fn status_line(status: u16) -> String {
    format!("Status Code: {}", status)
}
