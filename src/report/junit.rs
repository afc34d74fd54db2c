use super::types::{Status, TestResults};
use crate::runner::state::TestRecord;
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

fn seconds(ms: u64) -> String {
    (ms as f64 / 1000.0).to_string()
}

/// Generate JUnit XML report string from TestResults
pub fn generate_junit_xml(results: &TestResults) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let total_tests = results.tests.len();
    let count = |status: Status| results.tests.iter().filter(|t| t.status == status).count();
    let failures = count(Status::Failed);
    let errors = count(Status::Broken);
    let skipped = count(Status::Skipped);
    let total_duration: u64 = results.tests.iter().map(|t| t.duration_ms.unwrap_or(0)).sum();

    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", env!("CARGO_PKG_NAME")));
    suites_start.push_attribute(("tests", total_tests.to_string().as_str()));
    suites_start.push_attribute(("failures", failures.to_string().as_str()));
    suites_start.push_attribute(("errors", errors.to_string().as_str()));
    suites_start.push_attribute(("skipped", skipped.to_string().as_str()));
    suites_start.push_attribute(("time", seconds(total_duration).as_str()));
    writer.write_event(Event::Start(suites_start))?;

    // One <testsuite> per run
    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", "api"));
    suite_start.push_attribute(("tests", total_tests.to_string().as_str()));
    suite_start.push_attribute(("failures", failures.to_string().as_str()));
    suite_start.push_attribute(("errors", errors.to_string().as_str()));
    suite_start.push_attribute(("skipped", skipped.to_string().as_str()));
    suite_start.push_attribute(("id", results.session_id.as_str()));
    suite_start.push_attribute(("time", seconds(total_duration).as_str()));
    suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for test in &results.tests {
        write_test_case(&mut writer, test)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let result = writer.into_inner().into_inner();
    let xml = String::from_utf8(result)?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(writer: &mut Writer<W>, test: &TestRecord) -> Result<()> {
    let mut case_start = BytesStart::new("testcase");
    // module::Class::test_name -> module.Class
    let classname = test
        .test_id
        .rsplit_once("::")
        .map(|(prefix, _)| prefix.replace("::", "."))
        .unwrap_or_default();

    case_start.push_attribute(("name", test.name.as_str()));
    case_start.push_attribute(("classname", classname.as_str()));
    case_start.push_attribute(("time", seconds(test.duration_ms.unwrap_or(0)).as_str()));

    writer.write_event(Event::Start(case_start))?;

    let element = match test.status {
        Status::Failed => Some(("failure", "AssertionError")),
        Status::Broken => Some(("error", "Error")),
        Status::Skipped => Some(("skipped", "")),
        Status::Passed => None,
    };

    if let Some((tag, kind)) = element {
        let message = test.error.as_deref().unwrap_or("Unknown error");
        let first_line = message.lines().next().unwrap_or(message);

        let mut start = BytesStart::new(tag);
        start.push_attribute(("message", first_line));
        if !kind.is_empty() {
            start.push_attribute(("type", kind));
        }
        writer.write_event(Event::Start(start))?;
        if let Some(err) = &test.error {
            writer.write_event(Event::Text(BytesText::new(err)))?;
        }
        writer.write_event(Event::End(BytesEnd::new(tag)))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write report to file
pub fn write_report(results: &TestResults, output_dir: &Path) -> Result<()> {
    let xml = generate_junit_xml(results)?;
    let path = output_dir.join("junit.xml");
    std::fs::write(&path, xml)?;
    println!("JUnit report saved to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::state::TestSummary;

    fn record(id: &str, status: Status, error: Option<&str>) -> TestRecord {
        TestRecord {
            test_id: id.to_string(),
            name: id.rsplit("::").next().unwrap().to_string(),
            status,
            duration_ms: Some(1500),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_generate_junit_xml() {
        let results = TestResults {
            session_id: "test-session".to_string(),
            tests: vec![
                record("test_users_api::TestUsersAPI::test_get_single_user", Status::Passed, None),
                record(
                    "test_users_api::TestUsersAPI::test_delete_user",
                    Status::Failed,
                    Some("assertion failed: expected status 204, got 500"),
                ),
                record(
                    "test_auth_api::TestAuthentication::test_successful_login",
                    Status::Broken,
                    Some("request failed: connection refused"),
                ),
            ],
            summary: TestSummary {
                session_id: "test-session".to_string(),
                total: 3,
                passed: 1,
                failed: 1,
                broken: 1,
                skipped: 0,
                total_duration_ms: Some(4500),
            },
            generated_at: "2023-01-01 12:00:00".to_string(),
        };

        let xml = generate_junit_xml(&results).expect("Failed to generate XML");

        assert!(xml.contains(r#"<testsuites name="reqres-tester""#));
        assert!(xml.contains(r#"tests="3""#));
        assert!(xml.contains(r#"failures="1""#));
        assert!(xml.contains(r#"errors="1""#));
        assert!(xml.contains(r#"<testcase name="test_get_single_user" classname="test_users_api.TestUsersAPI""#));
        assert!(xml.contains(r#"message="assertion failed: expected status 204, got 500""#));
        assert!(xml.contains(r#"<error message="request failed: connection refused" type="Error">"#));
    }
}
