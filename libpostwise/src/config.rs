//! Configuration management for Postwise

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub audience: AudienceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Upper bound on a single completion call. Past this the call is
    /// treated as a transport failure.
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Posted samples required per platform before history outranks the
    /// advisor.
    pub min_history_samples: usize,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_history_samples: 5,
        }
    }
}

/// Audience snapshot supplied to timing analysis. A real deployment would
/// source this from the platforms' audience APIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudienceConfig {
    pub size: u64,
    pub timezone: String,
    pub age_group: String,
}

impl Default for AudienceConfig {
    fn default() -> Self {
        Self {
            size: 12_500,
            timezone: "UTC".to_string(),
            age_group: "25-45".to_string(),
        }
    }
}

impl From<AudienceConfig> for crate::types::AudienceProfile {
    fn from(config: AudienceConfig) -> Self {
        Self {
            size: config.size,
            timezone: config.timezone,
            age_group: config.age_group,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
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
            database: DatabaseConfig {
                path: "~/.local/share/postwise/posts.db".to_string(),
            },
            ai: AiConfig::default(),
            timing: TimingConfig::default(),
            audience: AudienceConfig::default(),
        }
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("POSTWISE_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("postwise").join("config.toml"))
}

/// Resolve the data directory path following XDG Base Directory spec
pub fn resolve_data_path() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| ConfigError::MissingField("data directory".to_string()))?;

    Ok(data_dir.join("postwise"))
}
