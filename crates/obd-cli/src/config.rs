//! Configuration file handling for obd2

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use obd_telemetry::DEFAULT_REFRESH_INTERVAL;
use serde::{Deserialize, Serialize};

/// Configuration for the CLI tool
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Sampling interval of the `log` command in milliseconds
    pub refresh_ms: Option<u64>,
    /// Directory for generated log files
    pub log_dir: Option<PathBuf>,
    /// Disable colored output
    pub no_color: Option<bool>,
    /// Per-request response timeout in milliseconds
    pub request_timeout_ms: Option<u64>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("obd2");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(&self, refresh_ms: Option<u64>, no_color: bool) -> MergedConfig {
        let refresh = refresh_ms
            .or(self.refresh_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL);

        MergedConfig {
            refresh,
            log_dir: self.log_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
            no_color: no_color || self.no_color.unwrap_or(false),
            request_timeout_ms: self.request_timeout_ms.unwrap_or(1000),
        }
    }
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub refresh: Duration,
    pub log_dir: PathBuf,
    pub no_color: bool,
    pub request_timeout_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let merged = Config::default().merge_with_args(None, false);
        assert_eq!(merged.refresh, Duration::from_millis(1000));
        assert_eq!(merged.log_dir, PathBuf::from("."));
        assert!(!merged.no_color);
        assert_eq!(merged.request_timeout_ms, 1000);
    }

    #[test]
    fn test_args_override_file() {
        let config = Config {
            refresh_ms: Some(500),
            no_color: Some(false),
            ..Default::default()
        };

        let merged = config.merge_with_args(Some(200), true);
        assert_eq!(merged.refresh, Duration::from_millis(200));
        assert!(merged.no_color);

        let merged = config.merge_with_args(None, false);
        assert_eq!(merged.refresh, Duration::from_millis(500));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
refresh_ms = 250
log_dir = "/var/log/obd2"
no_color = true
request_timeout_ms = 2000
"#,
        )
        .unwrap();

        let merged = Config::load_from(&path).unwrap().merge_with_args(None, false);
        assert_eq!(merged.refresh, Duration::from_millis(250));
        assert_eq!(merged.log_dir, PathBuf::from("/var/log/obd2"));
        assert!(merged.no_color);
        assert_eq!(merged.request_timeout_ms, 2000);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_from_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "refresh_ms = \"fast\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
