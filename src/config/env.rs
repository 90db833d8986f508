//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use super::AppConfig;

/// Environment variable prefix
const ENV_PREFIX: &str = "STRIDE";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// Parallel suites from STRIDE_PARALLEL
    pub parallel: Option<usize>,
    /// Report format from STRIDE_FORMAT
    pub format: Option<String>,
    /// Detail level from STRIDE_DETAILS
    pub details: Option<String>,
    /// Log level from STRIDE_LOG
    pub log_level: Option<String>,
    /// Report directory from STRIDE_OUTPUT_DIR
    pub output_dir: Option<PathBuf>,
    /// Default executor from STRIDE_DEFAULT_EXECUTOR
    pub default_executor: Option<String>,
    /// Step timeout seconds from STRIDE_STEP_TIMEOUT
    pub step_timeout: Option<u64>,
    /// Suite timeout seconds from STRIDE_SUITE_TIMEOUT
    pub suite_timeout: Option<u64>,
    /// Config file from STRIDE_CONFIG
    pub config_file: Option<PathBuf>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}")).filter(|v| !v.is_empty());

        Self {
            parallel: parse(get("PARALLEL")),
            format: get("FORMAT"),
            details: get("DETAILS"),
            log_level: get("LOG"),
            output_dir: get("OUTPUT_DIR").map(PathBuf::from),
            default_executor: get("DEFAULT_EXECUTOR"),
            step_timeout: parse(get("STEP_TIMEOUT")),
            suite_timeout: parse(get("SUITE_TIMEOUT")),
            config_file: get("CONFIG").map(PathBuf::from),
        }
    }

    /// Override `config` with every variable that is set
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(parallel) = self.parallel {
            config.parallel = parallel;
        }
        if let Some(format) = &self.format {
            config.format = format.clone();
        }
        if let Some(details) = &self.details {
            config.details = details.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(name) = &self.default_executor {
            config.default_executor = name.clone();
        }
        if let Some(secs) = self.step_timeout {
            config.step_timeout_secs = Some(secs);
        }
        if let Some(secs) = self.suite_timeout {
            config.suite_timeout_secs = Some(secs);
        }
    }
}

fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::from_lookup(lookup(&[]));
        assert_eq!(config, EnvConfig::default());
    }

    #[test]
    fn test_env_config_reads_prefixed_vars() {
        let config = EnvConfig::from_lookup(lookup(&[
            ("STRIDE_PARALLEL", "4"),
            ("STRIDE_FORMAT", "json"),
            ("STRIDE_STEP_TIMEOUT", "30"),
            ("STRIDE_CONFIG", "/etc/stride.yml"),
            ("PARALLEL", "9"),
        ]));

        assert_eq!(config.parallel, Some(4));
        assert_eq!(config.format.as_deref(), Some("json"));
        assert_eq!(config.step_timeout, Some(30));
        assert_eq!(config.config_file, Some(PathBuf::from("/etc/stride.yml")));
    }

    #[test]
    fn test_timeouts_parse_as_seconds() {
        let config = EnvConfig::from_lookup(lookup(&[
            ("STRIDE_PARALLEL", "3"),
            ("STRIDE_STEP_TIMEOUT", "5"),
            ("STRIDE_SUITE_TIMEOUT", "120"),
        ]));
        assert_eq!(config.parallel, Some(3));
        assert_eq!(config.step_timeout, Some(5));
        assert_eq!(config.suite_timeout, Some(120));

        let mut app = AppConfig::default();
        config.apply(&mut app);
        assert_eq!(app.step_timeout_secs, Some(5));
        assert_eq!(app.suite_timeout_secs, Some(120));
    }

    #[test]
    fn test_unparseable_and_empty_values_ignored() {
        let config = EnvConfig::from_lookup(lookup(&[
            ("STRIDE_PARALLEL", "lots"),
            ("STRIDE_DETAILS", ""),
        ]));
        assert_eq!(config.parallel, None);
        assert_eq!(config.details, None);
    }

    #[test]
    fn test_apply_overrides_only_set_values() {
        let mut app = AppConfig {
            parallel: 2,
            ..Default::default()
        };
        let env = EnvConfig::from_lookup(lookup(&[
            ("STRIDE_DETAILS", "high"),
            ("STRIDE_OUTPUT_DIR", "out"),
        ]));
        env.apply(&mut app);

        assert_eq!(app.parallel, 2);
        assert_eq!(app.details, "high");
        assert_eq!(app.output_dir, Some(PathBuf::from("out")));
    }
}
