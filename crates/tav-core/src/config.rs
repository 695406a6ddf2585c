//! Configuration management for tav.
//!
//! Loads configuration from ${TAV_HOME}/config.toml with sensible defaults.
//! The backend address resolves in this order:
//! 1. `TAV_BASE_URL` environment variable
//! 2. `base_url` in config.toml
//! 3. built-in default (`http://localhost:8000`)

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the feedback backend (scheme + host + port).
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    const DEFAULT_BASE_URL: &'static str = "http://localhost:8000";
    const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Loads configuration from the default config path and applies the
    /// `TAV_BASE_URL` environment override.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&paths::config_path())?;
        if let Ok(url) = std::env::var("TAV_BASE_URL") {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                config.base_url = trimmed.to_string();
            }
        }
        Ok(config)
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the default config template to the given path, creating parent
    /// directories. Refuses to overwrite an existing file.
    pub fn write_default(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("config already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Template written by `tav config init`.
fn default_config_template() -> &'static str {
    "\
# tav configuration

# Base URL of the feedback backend.
base_url = \"http://localhost:8000\"

# Per-request timeout in seconds.
request_timeout_secs = 10
"
}

pub mod paths {
    //! Path resolution for tav configuration and data directories.
    //!
    //! TAV_HOME resolution order:
    //! 1. TAV_HOME environment variable (if set)
    //! 2. ~/.config/tav (default)

    use std::path::PathBuf;

    /// Returns the tav home directory.
    pub fn tav_home() -> PathBuf {
        if let Ok(home) = std::env::var("TAV_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("tav"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        tav_home().join("config.toml")
    }

    /// Returns the directory for log files.
    pub fn logs_dir() -> PathBuf {
        tav_home().join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = \"http://backend:9000\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, "http://backend:9000");
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = [nonsense").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn template_round_trips_through_the_parser() {
        let config: Config = toml::from_str(default_config_template()).unwrap();
        assert_eq!(config.base_url, Config::default().base_url);
    }

    #[test]
    fn write_default_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::write_default(&path).unwrap();
        assert!(Config::write_default(&path).is_err());
    }
}
