//! Configuration file management
//!
//! Handles finding, loading, and validating configuration files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::AppConfig;
use crate::output::ReportFormat;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./stride.yml",
    "./stride.yaml",
    "./.stride.yml",
    "~/.config/stride/config.yml",
];

/// Full configuration file structure
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Version of config file format
    #[serde(default = "default_version")]
    pub version: String,

    /// Application settings, at the top level of the file
    #[serde(flatten)]
    pub app: AppConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: default_version(),
            app: AppConfig::default(),
        }
    }
}

impl ConfigFile {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.is_file())
    }

    /// Load `explicit` when given, else the first file found, else defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit.map(Path::to_path_buf).or_else(Self::find) {
            Some(path) => {
                debug!("Using config file {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.version != "1.0" {
            anyhow::bail!("Unsupported config version: {}", self.version);
        }

        if ReportFormat::from_str(&self.app.format).is_none() {
            anyhow::bail!(
                "Invalid format '{}', must be xml, json or yaml",
                self.app.format
            );
        }

        if !["low", "medium", "high"].contains(&self.app.details.to_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid details '{}', must be low, medium or high",
                self.app.details
            );
        }

        Ok(())
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_file_default() {
        let config = ConfigFile::default();
        assert_eq!(config.version, "1.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_flat_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stride.yml");
        std::fs::write(&path, "version: '1.0'\nparallel: 3\nformat: json\n").unwrap();

        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.app.parallel, 3);
        assert_eq!(config.app.format, "json");
        assert_eq!(config.app.details, "medium");
    }

    #[test]
    fn test_resolve_explicit_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "details: high\n").unwrap();

        let config = ConfigFile::resolve(Some(&path)).unwrap();
        assert_eq!(config.app.details, "high");
    }

    #[test]
    fn test_resolve_missing_explicit_path() {
        let dir = tempdir().unwrap();
        assert!(ConfigFile::resolve(Some(&dir.path().join("nope.yml"))).is_err());
    }

    #[test]
    fn test_validate_config() {
        let mut config = ConfigFile::default();
        config.app.format = "csv".to_string();
        assert!(config.validate().is_err());

        let mut config = ConfigFile::default();
        config.version = "2.0".to_string();
        assert!(config.validate().is_err());

        let mut config = ConfigFile::default();
        config.app.details = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("./stride.yml"), PathBuf::from("./stride.yml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_path("~/.config/stride/config.yml"),
                home.join(".config/stride/config.yml")
            );
        }
    }
}
