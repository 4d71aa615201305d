//! Configuration management for Onboard

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Location of the JSON settings file backing the key-value store
    pub path: String,

    /// How malformed stored JSON is handled on decode
    #[serde(default)]
    pub decode_policy: DecodePolicy,
}

/// Policy for handling malformed persisted JSON.
///
/// Historically decode failures were swallowed and the data treated as
/// absent. That stays the default, but the choice is explicit configuration
/// so corruption can be surfaced instead of masked.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Treat undecodable data as absent and log a warning
    #[default]
    Lenient,
    /// Surface undecodable data as a storage error
    Strict,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default_config());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            storage: StorageConfig {
                path: "~/.local/share/onboard/settings.json".to_string(),
                decode_policy: DecodePolicy::Lenient,
            },
        }
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("ONBOARD_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("onboard").join("config.toml"))
}

/// Expand a configured storage path to an absolute filesystem path
pub fn resolve_store_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}
