//! Suite discovery and loading
//!
//! A directory expands to the `*.yml` and `*.yaml` files directly inside it;
//! anything else is used as a glob pattern. Files are read and parsed
//! concurrently. A file that fails to load is logged and left out of the run.

use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use super::error::{LoadError, SetupError};
use super::progress::ProgressSender;
use crate::models::{SuiteDefinition, TestSuite};

const SUITE_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// Glob patterns to search for suite files under `path`
pub fn suite_patterns(path: &str) -> Vec<String> {
    if Path::new(path).is_dir() {
        let dir = path.trim_end_matches('/');
        SUITE_EXTENSIONS
            .iter()
            .map(|ext| format!("{dir}/*.{ext}"))
            .collect()
    } else {
        vec![path.to_string()]
    }
}

/// Expand `path` into the sorted list of suite files it designates
pub fn discover(path: &str) -> Result<Vec<PathBuf>, SetupError> {
    let mut files = Vec::new();

    for pattern in suite_patterns(path) {
        debug!("Searching suites with pattern {}", pattern);
        let entries = glob::glob(&pattern).map_err(|e| SetupError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;

        for entry in entries {
            match entry {
                Ok(file) if file.is_file() => files.push(file),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable path: {}", e),
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Read and parse one suite file
pub async fn load_suite(path: &Path) -> Result<TestSuite, LoadError> {
    let package = path.display().to_string();
    debug!("Reading {}", package);

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LoadError::Read {
            path: package.clone(),
            reason: e.to_string(),
        })?;

    let definition = SuiteDefinition::from_yaml(&content).map_err(|e| LoadError::Parse {
        path: package.clone(),
        reason: e.to_string(),
    })?;

    Ok(definition.into_suite(&package))
}

/// Load every file concurrently, at most `limit` at a time when given.
///
/// Suites come back in file order; files that fail to load are dropped.
pub async fn load_all(
    files: Vec<PathBuf>,
    limit: Option<usize>,
    progress: &ProgressSender,
) -> Vec<TestSuite> {
    let gate = limit.map(|n| Arc::new(Semaphore::new(n.max(1))));

    let handles: Vec<_> = files
        .into_iter()
        .map(|file| {
            let gate = gate.clone();
            tokio::spawn(async move {
                let _permit = match &gate {
                    Some(gate) => gate.acquire().await.ok(),
                    None => None,
                };
                load_suite(&file).await
            })
        })
        .collect();

    let mut suites = Vec::new();
    for result in join_all(handles).await {
        match result {
            Ok(Ok(suite)) => {
                progress.suite_queued(&suite.package, suite.step_count());
                suites.push(suite);
            }
            Ok(Err(e)) => error!("Dropping suite file: {}", e),
            Err(e) => error!("Suite loading task failed: {}", e),
        }
    }

    debug!("Loaded {} suites", suites.len());
    suites
}
