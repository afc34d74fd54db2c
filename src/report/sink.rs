use super::attachment::Attachment;
use super::types::{AttachmentRef, TestResult};
use crate::error::ReportError;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Destination for attachments and finished test results.
///
/// Sinks are fire-and-forget: implementations log their own I/O problems and
/// never report them back to the caller.
pub trait ReportSink {
    /// Take ownership of an attachment and return the reference to record
    fn store_attachment(&mut self, attachment: Attachment) -> AttachmentRef;

    /// Persist a finished test result
    fn publish(&mut self, result: TestResult);

    /// Record key/value properties describing the environment of the run
    fn write_environment(&mut self, _properties: &[(String, String)]) {}
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn store_attachment(&mut self, attachment: Attachment) -> AttachmentRef {
        (**self).store_attachment(attachment)
    }

    fn publish(&mut self, result: TestResult) {
        (**self).publish(result)
    }

    fn write_environment(&mut self, properties: &[(String, String)]) {
        (**self).write_environment(properties)
    }
}

/// Writes results in the Allure results-directory layout
pub struct AllureSink {
    dir: PathBuf,
}

impl AllureSink {
    /// Create the sink, creating `dir` if needed. With `clean`, stale
    /// result, container and attachment files are removed first.
    pub fn new(dir: &Path, clean: bool) -> Result<Self, ReportError> {
        std::fs::create_dir_all(dir).map_err(|source| ReportError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let sink = Self {
            dir: dir.to_path_buf(),
        };
        if clean {
            sink.clean();
        }
        Ok(sink)
    }

    fn clean(&self) {
        let pattern = self.dir.join("*-*.*");
        let Some(pattern) = pattern.to_str() else {
            return;
        };
        let Ok(paths) = glob::glob(pattern) else {
            return;
        };
        for path in paths.flatten() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.contains("-result.") || name.contains("-container.") || name.contains("-attachment.")
            {
                if let Err(e) = std::fs::remove_file(&path) {
                    log::warn!("Failed to remove stale result {}: {}", path.display(), e);
                }
            }
        }
    }

    fn write(&self, file_name: &str, content: &[u8]) -> Result<(), ReportError> {
        let path = self.dir.join(file_name);
        std::fs::write(&path, content).map_err(|source| ReportError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl ReportSink for AllureSink {
    fn store_attachment(&mut self, attachment: Attachment) -> AttachmentRef {
        let source = format!(
            "{}-attachment.{}",
            Uuid::new_v4(),
            attachment.kind.extension()
        );
        if let Err(e) = self.write(&source, &attachment.content) {
            log::warn!("Dropping attachment '{}': {}", attachment.name, e);
        }
        AttachmentRef {
            name: attachment.name,
            source,
            mime: attachment.kind.mime().to_string(),
        }
    }

    fn publish(&mut self, result: TestResult) {
        let file_name = format!("{}-result.json", result.uuid);
        let written = serde_json::to_vec_pretty(&result)
            .map_err(ReportError::from)
            .and_then(|json| self.write(&file_name, &json));
        match written {
            Ok(()) => log::debug!("Wrote {}", file_name),
            Err(e) => log::warn!("Failed to write result for '{}': {}", result.full_name, e),
        }
    }

    fn write_environment(&mut self, properties: &[(String, String)]) {
        let body: String = properties
            .iter()
            .map(|(k, v)| format!("{} = {}\n", k, v))
            .collect();
        if let Err(e) = self.write("environment.properties", body.as_bytes()) {
            log::warn!("Failed to write environment properties: {}", e);
        }
    }
}

/// Keeps everything in memory; used when file output is disabled
#[derive(Debug, Default)]
pub struct MemorySink {
    pub attachments: Vec<(AttachmentRef, Attachment)>,
    pub results: Vec<TestResult>,
    pub environment: Vec<(String, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored attachments with the given name, in emission order
    pub fn attachments_named(&self, name: &str) -> Vec<&Attachment> {
        self.attachments
            .iter()
            .filter(|(r, _)| r.name == name)
            .map(|(_, a)| a)
            .collect()
    }
}

impl ReportSink for MemorySink {
    fn store_attachment(&mut self, attachment: Attachment) -> AttachmentRef {
        let reference = AttachmentRef {
            name: attachment.name.clone(),
            source: format!(
                "{}-attachment.{}",
                Uuid::new_v4(),
                attachment.kind.extension()
            ),
            mime: attachment.kind.mime().to_string(),
        };
        self.attachments.push((reference.clone(), attachment));
        reference
    }

    fn publish(&mut self, result: TestResult) {
        self.results.push(result);
    }

    fn write_environment(&mut self, properties: &[(String, String)]) {
        self.environment = properties.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::{Stage, Status, StatusDetails};

    fn sample_result(uuid: &str) -> TestResult {
        TestResult {
            uuid: uuid.to_string(),
            history_id: "h".to_string(),
            test_case_id: "c".to_string(),
            full_name: "suite::test_one".to_string(),
            name: "Test: test_one".to_string(),
            description: None,
            status: Status::Passed,
            status_details: StatusDetails::default(),
            stage: Stage::Finished,
            start: 1,
            stop: 2,
            labels: vec![],
            steps: vec![],
            attachments: vec![],
        }
    }

    #[test]
    fn test_allure_sink_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = AllureSink::new(dir.path(), false).unwrap();

        let reference = sink.store_attachment(Attachment::text("Timing Info", "Duration: 0.01s"));
        assert_eq!(reference.mime, "text/plain");
        assert!(reference.source.ends_with("-attachment.txt"));
        let stored = std::fs::read_to_string(dir.path().join(&reference.source)).unwrap();
        assert_eq!(stored, "Duration: 0.01s");

        sink.publish(sample_result("abc"));
        let json = std::fs::read_to_string(dir.path().join("abc-result.json")).unwrap();
        let parsed: TestResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.full_name, "suite::test_one");
        assert!(json.contains("\"fullName\""));
        assert!(json.contains("\"stage\": \"finished\""));
    }

    #[test]
    fn test_allure_sink_clean_removes_stale_results() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("old-result.json"), "{}").unwrap();
        std::fs::write(dir.path().join("old-attachment.txt"), "x").unwrap();
        std::fs::write(dir.path().join("categories.json"), "[]").unwrap();

        AllureSink::new(dir.path(), true).unwrap();

        assert!(!dir.path().join("old-result.json").exists());
        assert!(!dir.path().join("old-attachment.txt").exists());
        assert!(dir.path().join("categories.json").exists());
    }

    #[test]
    fn test_environment_properties() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = AllureSink::new(&dir.path().join("nested"), false).unwrap();
        sink.write_environment(&[("API_BASE_URL".to_string(), "http://x".to_string())]);
        let body =
            std::fs::read_to_string(dir.path().join("nested/environment.properties")).unwrap();
        assert_eq!(body, "API_BASE_URL = http://x\n");
    }
}
