//! Suite definition documents
//!
//! The YAML shape users write. It is converted into a [`TestSuite`] once
//! parsed, so the report model never has to accept authoring shortcuts.

use serde::Deserialize;

use super::step::TestStep;
use super::test_result::{TestCase, TestSuite};

/// Skip marker: either `skipped: true` or a non-zero count
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SkipMarker {
    Flag(bool),
    Count(u64),
}

impl Default for SkipMarker {
    fn default() -> Self {
        SkipMarker::Flag(false)
    }
}

impl SkipMarker {
    pub fn is_set(self) -> bool {
        match self {
            SkipMarker::Flag(flag) => flag,
            SkipMarker::Count(count) => count > 0,
        }
    }
}

/// A case as written in a suite file
#[derive(Clone, Debug, Deserialize)]
pub struct CaseDefinition {
    pub name: String,
    #[serde(default)]
    pub skipped: SkipMarker,
    #[serde(default)]
    pub steps: Vec<TestStep>,
}

/// A suite file. Keys other than `name` and `testcases` are ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct SuiteDefinition {
    pub name: String,
    #[serde(default)]
    pub testcases: Vec<CaseDefinition>,
}

impl SuiteDefinition {
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Build the runtime suite; the source path is appended to the display name
    pub fn into_suite(self, package: &str) -> TestSuite {
        let suite_name = format!("{} [{}]", self.name, package);

        let test_cases: Vec<TestCase> = self
            .testcases
            .into_iter()
            .map(|def| {
                let mut case = TestCase::new(def.name);
                case.classname = suite_name.clone();
                case.steps = def.steps;
                if def.skipped.is_set() {
                    case = case.skip();
                }
                case
            })
            .collect();

        let mut suite = TestSuite::new(suite_name, package);
        suite.total = test_cases.len();
        suite.test_cases = test_cases;
        suite.count_skipped();
        suite
    }
}
