use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct GitConfig {
    /// Name or path of the git executable
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Remote used by remote branch, fetch and URL queries
    #[serde(default = "default_remote")]
    pub remote: String,
    /// Upper bound for a single call made through `AsyncRepository`
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Committer identity written into repositories created by this crate
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub name: String,
    pub email: String,
}

fn default_binary() -> String {
    "git".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            binary: default_binary(),
            remote: default_remote(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("gitrev"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::config_path()?)
    }

    /// Load configuration from the default location, falling back to
    /// defaults when no file exists
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = match Self::config_path() {
            Ok(path) => path,
            Err(ConfigError::DirectoryNotFound) => return Ok(Self::default_config()),
            Err(e) => return Err(e),
        };

        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default_config());
        }

        Self::load_from(path)
    }

    /// Load and validate configuration from a specific file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("Loading config from {}", path.display());

        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::config_path()?)
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;

        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Config {
            git: GitConfig::default(),
            identity: None,
        }
    }

    /// Timeout applied to each asynchronous repository call
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.git.timeout_seconds)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.git.binary.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "git.binary must not be empty".to_string(),
            ));
        }

        if self.git.remote.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "git.remote must not be empty".to_string(),
            ));
        }

        if self.git.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "git.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if let Some(identity) = &self.identity
            && (identity.name.trim().is_empty() || identity.email.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue(
                "identity.name and identity.email must both be set".to_string(),
            ));
        }

        Ok(())
    }
}
