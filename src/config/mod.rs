//! Configuration module
//!
//! Handles loading and managing configuration. Values are layered:
//! defaults, then the config file, then `STRIDE_*` environment variables,
//! then command line flags.

pub mod env;
pub mod file;

pub use env::EnvConfig;
pub use file::ConfigFile;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::DEFAULT_EXECUTOR;

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Maximum number of suites running at once
    pub parallel: usize,

    /// Report format: xml, json or yaml
    pub format: String,

    /// Output detail: low, medium or high
    pub details: String,

    /// Log level for the run
    pub log_level: String,

    /// Directory the report file is written to; no report when unset
    pub output_dir: Option<PathBuf>,

    /// Executor for steps without a `type`
    pub default_executor: String,

    pub step_timeout_secs: Option<u64>,

    pub suite_timeout_secs: Option<u64>,

    /// Maximum number of suite files read at once
    pub load_parallelism: Option<usize>,

    /// `name:value` alias entries
    pub aliases: Vec<String>,

    /// Print the run summary
    pub resume: bool,

    /// Include failed suites in the run summary
    pub resume_failures: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            parallel: 1,
            format: "xml".to_string(),
            details: "medium".to_string(),
            log_level: "warn".to_string(),
            output_dir: None,
            default_executor: DEFAULT_EXECUTOR.to_string(),
            step_timeout_secs: None,
            suite_timeout_secs: None,
            load_parallelism: None,
            aliases: Vec::new(),
            resume: true,
            resume_failures: true,
        }
    }
}

impl AppConfig {
    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_secs.map(Duration::from_secs)
    }

    pub fn suite_timeout(&self) -> Option<Duration> {
        self.suite_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.parallel, 1);
        assert_eq!(config.format, "xml");
        assert_eq!(config.details, "medium");
        assert_eq!(config.default_executor, "exec");
        assert!(config.resume);
        assert!(config.step_timeout().is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: AppConfig =
            serde_yaml::from_str("parallel: 4\nstep_timeout_secs: 10\naliases:\n- 'up:echo up'\n")
                .unwrap();
        assert_eq!(config.parallel, 4);
        assert_eq!(config.step_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.aliases, vec!["up:echo up"]);
        assert_eq!(config.format, "xml");
    }

    #[test]
    fn test_invalid_value_rejected() {
        assert!(serde_yaml::from_str::<AppConfig>("parallel: many").is_err());
    }
}
