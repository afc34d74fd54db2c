use super::scope::TestScope;
use crate::error::CaseResult;
use crate::report::types::Label;

/// Allure severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Blocker,
    Critical,
    Normal,
    Minor,
    Trivial,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Blocker => "blocker",
            Severity::Critical => "critical",
            Severity::Normal => "normal",
            Severity::Minor => "minor",
            Severity::Trivial => "trivial",
        }
    }
}

/// Descriptive metadata attached to a test at collection time
#[derive(Debug, Clone)]
pub struct TestMetadata {
    pub epic: &'static str,
    pub feature: &'static str,
    pub story: &'static str,
    pub title: &'static str,
    pub severity: Severity,
    pub tags: &'static [&'static str],
}

pub type TestBody = fn(&mut TestScope<'_, '_>) -> CaseResult;

/// One registered test: identifier, metadata and body
#[derive(Clone)]
pub struct TestCase {
    /// `module::Class::test_name`
    pub id: &'static str,
    pub meta: TestMetadata,
    pub body: TestBody,
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("id", &self.id)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

impl TestCase {
    /// Last segment of the identifier
    pub fn name(&self) -> &'static str {
        self.id.rsplit("::").next().unwrap_or(self.id)
    }

    pub fn has_tags(&self, required: &[String]) -> bool {
        required
            .iter()
            .all(|req| self.meta.tags.iter().any(|t| t.eq_ignore_ascii_case(req)))
    }

    /// Report labels derived from the identifier and metadata
    pub fn labels(&self) -> Vec<Label> {
        let mut segments = self.id.split("::");
        let module = segments.next().unwrap_or_default();
        let class = segments.next().filter(|_| self.id.matches("::").count() >= 2);

        let mut labels = vec![
            Label::new("epic", self.meta.epic),
            Label::new("feature", self.meta.feature),
            Label::new("story", self.meta.story),
            Label::new("severity", self.meta.severity.as_str()),
            Label::new("parentSuite", module),
            Label::new("framework", env!("CARGO_PKG_NAME")),
            Label::new("language", "rust"),
        ];
        if let Some(class) = class {
            labels.push(Label::new("suite", class));
            labels.push(Label::new("testClass", class));
        }
        labels.extend(self.meta.tags.iter().map(|t| Label::new("tag", *t)));
        if let Ok(host) = std::env::var("HOSTNAME") {
            labels.push(Label::new("host", host));
        }
        labels
    }
}

/// Select cases matching every required tag and, if given, a substring of
/// the identifier.
pub fn select<'a>(
    cases: &'a [TestCase],
    tags: Option<&[String]>,
    name: Option<&str>,
) -> Vec<&'a TestCase> {
    cases
        .iter()
        .filter(|c| tags.map_or(true, |t| c.has_tags(t)))
        .filter(|c| name.map_or(true, |n| c.id.contains(n)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut TestScope<'_, '_>) -> CaseResult {
        Ok(())
    }

    fn case(id: &'static str, tags: &'static [&'static str]) -> TestCase {
        TestCase {
            id,
            meta: TestMetadata {
                epic: "ReqRes API",
                feature: "User Management",
                story: "Get Users",
                title: "Get list of users",
                severity: Severity::Critical,
                tags,
            },
            body: noop,
        }
    }

    #[test]
    fn test_name_and_labels() {
        let c = case("test_users_api::TestUsersAPI::test_get_users_list", &["smoke", "users"]);
        assert_eq!(c.name(), "test_get_users_list");

        let labels = c.labels();
        let get = |n: &str| labels.iter().find(|l| l.name == n).map(|l| l.value.as_str());
        assert_eq!(get("epic"), Some("ReqRes API"));
        assert_eq!(get("severity"), Some("critical"));
        assert_eq!(get("parentSuite"), Some("test_users_api"));
        assert_eq!(get("suite"), Some("TestUsersAPI"));
        assert_eq!(labels.iter().filter(|l| l.name == "tag").count(), 2);
    }

    #[test]
    fn test_select_by_tags_and_name() {
        let cases = vec![
            case("m::A::test_one", &["smoke", "auth"]),
            case("m::A::test_two", &["auth"]),
            case("m::B::test_three", &[]),
        ];

        let smoke_auth = select(&cases, Some(&["smoke".to_string(), "AUTH".to_string()]), None);
        assert_eq!(smoke_auth.len(), 1);
        assert_eq!(smoke_auth[0].id, "m::A::test_one");

        let by_name = select(&cases, None, Some("B::"));
        assert_eq!(by_name.len(), 1);

        assert_eq!(select(&cases, None, None).len(), 3);
    }
}
