//! Configuration module for qui-select
//!
//! Manages application configuration: the default snapshot, list paging and
//! cache timings. Configuration is stored in the user's config directory.

use crate::view::ViewConfig;
use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct QuiConfig {
    /// Snapshot file used when `--snapshot` is not given
    pub snapshot: Option<PathBuf>,

    /// Instance used when `--instance` is not given
    pub default_instance: u32,

    /// Rows per list page
    pub page_size: usize,

    /// Delay before re-fetching after an optimistic delete, in milliseconds
    pub reconcile_delay_ms: u64,

    /// Maximum age of a cached list page, in seconds
    pub cache_ttl_secs: u64,

    /// Ask before running destructive actions
    pub confirm_delete: bool,

    /// Log filter used when neither `RUST_LOG` nor `-v` is given
    pub log_level: Option<String>,
}

impl Default for QuiConfig {
    fn default() -> Self {
        Self {
            snapshot: None,
            default_instance: 1,
            page_size: 100,
            reconcile_delay_ms: 1500,
            cache_ttl_secs: 30,
            confirm_delete: true,
            log_level: None,
        }
    }
}

impl QuiConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("qui-select").join("config.toml"))
    }

    /// Load configuration from the default location, creating it if missing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file does not exist or cannot be parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the parent directory cannot be created, the
    /// configuration cannot be serialized, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// View tunables derived from this configuration
    #[must_use]
    pub fn view_config(&self) -> ViewConfig {
        ViewConfig {
            page_size: self.page_size.max(1),
            reconcile_delay: Duration::from_millis(self.reconcile_delay_ms),
            cache_ttl: Duration::from_secs(self.cache_ttl_secs.max(1)),
        }
    }
}
