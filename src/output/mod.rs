//! Output formatting module
//!
//! Report serialization and the report file writer.

mod formatter;
mod xml;

pub use formatter::{ReportFormat, ResultFormatter};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::models::Tests;

/// Base name of report files
pub const REPORT_FILE_STEM: &str = "test_results";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(String),

    #[error("failed to write report {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Write the report to `dir/test_results.<ext>`, creating `dir` if needed
pub fn write_report(dir: &Path, tests: &Tests, format: ReportFormat) -> Result<PathBuf, ReportError> {
    let content = ResultFormatter::new(format).format_report(tests)?;
    let path = dir.join(format!("{}.{}", REPORT_FILE_STEM, format.extension()));

    let write_err = |source: std::io::Error| ReportError::Write {
        path: path.display().to_string(),
        source,
    };
    fs::create_dir_all(dir).map_err(write_err)?;
    fs::write(&path, content).map_err(write_err)?;

    info!("Report written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_report() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("reports");

        let path = write_report(&out, &Tests::default(), ReportFormat::Json).unwrap();
        assert_eq!(path, out.join("test_results.json"));

        let content = fs::read_to_string(&path).unwrap();
        let parsed: Tests = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.total, 0);
    }

    #[test]
    fn test_write_report_into_file_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let err = write_report(&blocker, &Tests::default(), ReportFormat::Xml).unwrap_err();
        assert!(matches!(err, ReportError::Write { .. }));
    }
}
