//! Report and summary formatting
//!
//! Renders the aggregate as XML, JSON or YAML, and produces the short
//! run summary printed at the end of a run.

use std::fmt::Write;
use std::time::Duration;

use super::xml;
use super::ReportError;
use crate::models::Tests;

/// Serialization format of the report file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Xml,
    Json,
    Yaml,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "xml" => Some(ReportFormat::Xml),
            "json" => Some(ReportFormat::Json),
            "yaml" | "yml" => Some(ReportFormat::Yaml),
            _ => None,
        }
    }

    /// File extension of reports in this format
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Xml => "xml",
            ReportFormat::Json => "json",
            ReportFormat::Yaml => "yml",
        }
    }
}

/// Result formatter
#[derive(Clone, Copy, Debug)]
pub struct ResultFormatter {
    format: ReportFormat,
}

impl ResultFormatter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Serialize the whole aggregate
    pub fn format_report(&self, tests: &Tests) -> Result<String, ReportError> {
        match self.format {
            ReportFormat::Xml => {
                xml::render(tests).map_err(|e| ReportError::Serialize(e.to_string()))
            }
            ReportFormat::Json => serde_json::to_string_pretty(tests)
                .map_err(|e| ReportError::Serialize(e.to_string())),
            ReportFormat::Yaml => {
                serde_yaml::to_string(tests).map_err(|e| ReportError::Serialize(e.to_string()))
            }
        }
    }

    /// Run summary: failed suites (when `with_failures`) then the totals line
    pub fn format_summary(&self, tests: &Tests, elapsed: Duration, with_failures: bool) -> String {
        let mut output = String::new();

        if with_failures {
            for suite in tests.failed_suites() {
                let _ = writeln!(output, "FAILED {}", suite.name);
                let _ = writeln!(output, "{:-^60}", "");
                for case in &suite.test_cases {
                    for diagnostic in case.errors.iter().chain(&case.failures) {
                        let _ = writeln!(output, "  {}: {}", case.name, diagnostic);
                    }
                }
                let _ = writeln!(output, "{:-^60}", "");
            }
        }

        let _ = write!(
            output,
            "Total:{} TotalOK:{} TotalKO:{} TotalSkipped:{} TotalTestSuite:{} TotalTestCase:{} TotalTestStep:{} Duration:{}",
            tests.total,
            tests.total_ok,
            tests.total_ko,
            tests.total_skipped,
            tests.test_suites.len(),
            tests.case_count(),
            tests.step_count(),
            format_duration(elapsed)
        );

        output
    }
}

fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{:.3}s", elapsed.as_secs_f64())
    }
}
