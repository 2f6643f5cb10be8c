//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/apiscope/config.toml` unless an
//! explicit path is given.
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/apiscope/` (~/.config/apiscope/)
//! - State/Logs: `$XDG_STATE_HOME/apiscope/` (~/.local/state/apiscope/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Analysis configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Analysis engine and body codec settings
#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// Nesting depth at which schema inference stops descending
    #[serde(default = "default_max_schema_depth")]
    pub max_schema_depth: usize,

    /// Text and JSON bodies larger than this many bytes are truncated to binary on load
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_schema_depth: default_max_schema_depth(),
            max_body_size: default_max_body_size(),
        }
    }
}

fn default_max_schema_depth() -> usize {
    32
}

fn default_max_body_size() -> usize {
    crate::body::DEFAULT_MAX_BODY_SIZE
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.analysis.validate()?;
        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/apiscope/config.toml` (~/.config/apiscope/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("apiscope").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/apiscope/` (~/.local/state/apiscope/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("apiscope")
    }
}

impl AnalysisConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.max_schema_depth == 0 {
            return Err(Error::Config(
                "analysis.max_schema_depth must be at least 1".to_string(),
            ));
        }
        if self.max_body_size == 0 {
            return Err(Error::Config(
                "analysis.max_body_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.max_schema_depth, 32);
        assert_eq!(config.analysis.max_body_size, 1_048_576);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[analysis]
max_schema_depth = 8

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.analysis.max_schema_depth, 8);
        assert_eq!(config.analysis.max_body_size, 1_048_576);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_from_rejects_zero_depth() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analysis]\nmax_schema_depth = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_state_dir_is_app_scoped() {
        assert!(Config::state_dir().ends_with("apiscope"));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Config::load_from(Path::new("/nonexistent/apiscope.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
