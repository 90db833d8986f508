//! Result models for suite execution
//!
//! Defines the aggregate result, suites, cases and failures. These types are
//! what the report serializers render, so field names follow the JUnit-shaped
//! report keys.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::step::TestStep;

/// Outcome of a single test case
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    #[default]
    Pending,
    Running,
    Passed,
    Failed,
    Errored,
    Skipped,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "pending",
            CaseStatus::Running => "running",
            CaseStatus::Passed => "passed",
            CaseStatus::Failed => "failed",
            CaseStatus::Errored => "errored",
            CaseStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic attached to a case, either as an error or as a failure
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub value: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Failure {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: None,
            message: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "[{kind}] {}", self.value),
            None => f.write_str(&self.value),
        }
    }
}

/// Captured output stream of a case
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerResult {
    pub value: String,
}

impl InnerResult {
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.value.is_empty() && !self.value.ends_with('\n') {
            self.value.push('\n');
        }
        self.value.push_str(text);
    }
}

/// A single test case with its steps and result
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub assertions: String,
    #[serde(default)]
    pub classname: String,
    #[serde(default)]
    pub errors: Vec<Failure>,
    #[serde(default)]
    pub failures: Vec<Failure>,
    pub name: String,
    #[serde(default)]
    pub skipped: usize,
    #[serde(default)]
    pub status: CaseStatus,
    #[serde(default)]
    pub systemout: InnerResult,
    #[serde(default)]
    pub systemerr: InnerResult,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub steps: Vec<TestStep>,
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn with_step(mut self, step: TestStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn skip(mut self) -> Self {
        self.skipped = 1;
        self.status = CaseStatus::Skipped;
        self
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped > 0
    }

    /// Derive the terminal status from what was recorded while running
    pub fn settle(&mut self) {
        self.status = if self.is_skipped() {
            CaseStatus::Skipped
        } else if !self.errors.is_empty() {
            CaseStatus::Errored
        } else if !self.failures.is_empty() {
            CaseStatus::Failed
        } else {
            CaseStatus::Passed
        };
    }
}

/// A named collection of cases loaded from one suite file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    #[serde(default)]
    pub disabled: usize,
    #[serde(default)]
    pub errors: usize,
    #[serde(default)]
    pub failures: usize,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub skipped: usize,
    #[serde(default)]
    pub total: usize,
    #[serde(default, rename = "tests")]
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub timestamp: String,
}

impl TestSuite {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn with_case(mut self, case: TestCase) -> Self {
        self.test_cases.push(case);
        self.total = self.test_cases.len();
        self
    }

    /// Number of steps across all cases, used to size progress output
    pub fn step_count(&self) -> usize {
        self.test_cases.iter().map(|tc| tc.steps.len()).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failures == 0 && self.errors == 0
    }

    /// Recount skipped cases; skipping is decided at load time so this is idempotent
    pub fn count_skipped(&mut self) {
        self.skipped = self.test_cases.iter().filter(|tc| tc.is_skipped()).count();
    }
}

/// Aggregate result of a whole run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tests {
    pub total: usize,
    #[serde(rename = "ok")]
    pub total_ok: usize,
    #[serde(rename = "ko")]
    pub total_ko: usize,
    #[serde(rename = "skipped")]
    pub total_skipped: usize,
    #[serde(default)]
    pub test_suites: Vec<TestSuite>,
}

impl Tests {
    /// Fold a completed suite into the totals.
    ///
    /// A suite with any failure contributes its failure count to `ko` and
    /// nothing to `ok`, even when some of its cases passed. Otherwise every
    /// case (skipped ones included) counts towards `ok`.
    pub fn add_suite(&mut self, suite: TestSuite) {
        if suite.failures > 0 {
            self.total_ko += suite.failures;
        } else {
            self.total_ok += suite.test_cases.len();
        }
        self.total_skipped += suite.skipped;
        self.total = self.total_ok + self.total_ko + self.total_skipped;
        self.test_suites.push(suite);
    }

    pub fn case_count(&self) -> usize {
        self.test_suites.iter().map(|s| s.test_cases.len()).sum()
    }

    pub fn step_count(&self) -> usize {
        self.test_suites.iter().map(TestSuite::step_count).sum()
    }

    pub fn failed_suites(&self) -> impl Iterator<Item = &TestSuite> {
        self.test_suites.iter().filter(|s| !s.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suite_with(cases: usize, failures: usize, skipped: usize) -> TestSuite {
        let mut suite = TestSuite::new("s", "s.yml");
        for i in 0..cases {
            suite = suite.with_case(TestCase::new(format!("case {i}")));
        }
        suite.failures = failures;
        suite.skipped = skipped;
        suite
    }

    #[test]
    fn test_suite_total_tracks_cases() {
        let suite = suite_with(3, 0, 0);
        assert_eq!(suite.total, suite.test_cases.len());
    }

    #[test]
    fn test_passing_suite_contributes_all_cases_to_ok() {
        let mut tests = Tests::default();
        tests.add_suite(suite_with(4, 0, 0));
        assert_eq!(tests.total_ok, 4);
        assert_eq!(tests.total_ko, 0);
        assert_eq!(tests.total, 4);
    }

    #[test]
    fn test_failing_suite_contributes_no_ok() {
        let mut tests = Tests::default();
        tests.add_suite(suite_with(5, 2, 0));
        assert_eq!(tests.total_ok, 0);
        assert_eq!(tests.total_ko, 2);
        assert_eq!(tests.total, 2);
    }

    #[test]
    fn test_totals_add_up() {
        let mut tests = Tests::default();
        tests.add_suite(suite_with(2, 0, 1));
        tests.add_suite(suite_with(3, 1, 0));
        assert_eq!(tests.total, tests.total_ok + tests.total_ko + tests.total_skipped);
        assert_eq!(tests.total_ok, 2);
        assert_eq!(tests.total_ko, 1);
        assert_eq!(tests.total_skipped, 1);
        assert_eq!(tests.test_suites.len(), 2);
    }

    #[test]
    fn test_case_settle() {
        let mut case = TestCase::new("c");
        case.settle();
        assert_eq!(case.status, CaseStatus::Passed);

        case.failures.push(Failure::new("boom"));
        case.settle();
        assert_eq!(case.status, CaseStatus::Failed);

        case.errors.push(Failure::new("no executor"));
        case.settle();
        assert_eq!(case.status, CaseStatus::Errored);

        let mut skipped = TestCase::new("s").skip();
        skipped.settle();
        assert_eq!(skipped.status, CaseStatus::Skipped);
    }

    #[test]
    fn test_inner_result_append() {
        let mut out = InnerResult::default();
        out.append("one");
        out.append("");
        out.append("two");
        assert_eq!(out.value, "one\ntwo");
    }

    #[test]
    fn test_failure_display() {
        let failure = Failure::new("expected 0").with_kind("assertion");
        assert_eq!(failure.to_string(), "[assertion] expected 0");
        assert_eq!(Failure::new("plain").to_string(), "plain");
    }
}
