//! Engine error types

use thiserror::Error;

/// Conditions that abort a run before any suite executes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid details level '{0}', must be low, medium or high")]
    InvalidDetailLevel(String),

    #[error("invalid report format '{0}', must be xml, json or yaml")]
    InvalidFormat(String),
}

/// A suite file that could not be turned into a suite; the file is skipped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },
}
