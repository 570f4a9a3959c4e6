//! Configuration file handling for `~/.linelab/config.ini`.
//!
//! Loads and saves user configuration with sensible defaults. A missing
//! file yields the defaults; `ensure_exists` writes them out for the user
//! to edit.

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or parse the config file
    #[error("failed to read config file: {0}")]
    Read(#[from] ini::Error),

    /// Failed to write the config file
    #[error("failed to write config file: {0}")]
    Write(String),

    /// Failed to create the config directory
    #[error("failed to create config directory: {0}")]
    Directory(std::io::Error),

    /// A setting value could not be interpreted
    #[error("invalid configuration: {section}.{key} = '{value}'")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}

/// Data storage settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    /// Directory holding table, cross-section, and metadata files.
    pub directory: PathBuf,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Directory for log files.
    pub directory: PathBuf,
    /// Log file name.
    pub file: String,
}

/// Remote line-data service settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    /// Service host, scheme included.
    pub host: String,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub data: DataSettings,
    pub logging: LoggingSettings,
    pub provider: ProviderSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let base = config_directory();
        Self {
            data: DataSettings {
                directory: base.join("data"),
            },
            logging: LoggingSettings {
                directory: base.join("logs"),
                file: "linelab.log".to_string(),
            },
            provider: ProviderSettings {
                host: crate::provider::DEFAULT_HOST.to_string(),
                timeout_secs: 90,
            },
        }
    }
}

impl ConfigFile {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads configuration from a specific path; a missing file yields the
    /// defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path)?;
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("data")) {
            if let Some(dir) = section.get("directory") {
                config.data.directory = PathBuf::from(dir);
            }
        }
        if let Some(section) = ini.section(Some("logging")) {
            if let Some(dir) = section.get("directory") {
                config.logging.directory = PathBuf::from(dir);
            }
            if let Some(file) = section.get("file") {
                config.logging.file = file.to_string();
            }
        }
        if let Some(section) = ini.section(Some("provider")) {
            if let Some(host) = section.get("host") {
                config.provider.host = host.to_string();
            }
            if let Some(timeout) = section.get("timeout_secs") {
                config.provider.timeout_secs =
                    timeout.parse().map_err(|_| ConfigError::InvalidValue {
                        section: "provider".to_string(),
                        key: "timeout_secs".to_string(),
                        value: timeout.to_string(),
                    })?;
            }
        }
        Ok(config)
    }

    /// Saves configuration to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Directory)?;
        }

        let mut ini = Ini::new();
        ini.with_section(Some("data"))
            .set("directory", self.data.directory.to_string_lossy().as_ref());
        ini.with_section(Some("logging"))
            .set(
                "directory",
                self.logging.directory.to_string_lossy().as_ref(),
            )
            .set("file", &self.logging.file);
        ini.with_section(Some("provider"))
            .set("host", &self.provider.host)
            .set("timeout_secs", self.provider.timeout_secs.to_string());

        ini.write_to_file(path)
            .map_err(|e| ConfigError::Write(e.to_string()))
    }

    /// Writes the default config file if none exists yet; returns its path.
    pub fn ensure_exists() -> Result<PathBuf, ConfigError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }
}

/// The configuration directory, `~/.linelab`.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".linelab")
}

/// The configuration file path, `~/.linelab/config.ini`.
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
