use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::audio::growable::{BufferLimits, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE};
use crate::error::ConfigError;

/// Streamer configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamerConfig {
    /// Initial compressed buffer size in bytes
    pub min_buffer_size: usize,
    /// The compressed buffer never doubles past this size
    pub max_buffer_size: usize,
    /// Request size used by the CLI for each PCM read
    pub read_size: usize,
    pub log_level: String,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            min_buffer_size: MIN_BUFFER_SIZE,
            max_buffer_size: MAX_BUFFER_SIZE,
            read_size: 4096,
            log_level: "warn".to_string(),
        }
    }
}

impl StreamerConfig {
    /// Validated buffer limits
    pub fn limits(&self) -> Result<BufferLimits, ConfigError> {
        BufferLimits::new(self.min_buffer_size, self.max_buffer_size)
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    config: StreamerConfig,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Load the configuration from the default location
    pub fn new() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::with_path(config_path)
    }

    /// Load the configuration from `config_path`, using defaults if it is missing
    pub fn with_path(config_path: PathBuf) -> Result<Self, ConfigError> {
        let config = Self::load_config(&config_path)?;
        Ok(Self { config, config_path })
    }

    pub fn get_config(&self) -> &StreamerConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn update_config<F>(&mut self, updater: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut StreamerConfig),
    {
        let mut updated = self.config.clone();
        updater(&mut updated);
        updated.limits()?;
        self.config = updated;
        self.save_config()
    }

    pub fn reset_to_defaults(&mut self) -> Result<(), ConfigError> {
        self.config = StreamerConfig::default();
        self.save_config()
    }

    /// `~/.config/audio-streamer/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::home_dir()
            .ok_or(ConfigError::ConfigDirNotFound)?
            .join(".config")
            .join("audio-streamer");

        Ok(config_dir.join("config.toml"))
    }

    fn load_config(path: &Path) -> Result<StreamerConfig, ConfigError> {
        if !path.exists() {
            debug!("No configuration at {}, using defaults", path.display());
            return Ok(StreamerConfig::default());
        }

        let config_content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;

        let config: StreamerConfig =
            toml::from_str(&config_content).map_err(ConfigError::DeserializationError)?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn save_config(&self) -> Result<(), ConfigError> {
        // Ensure the parent directory exists
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::IoError)?;
        }

        let config_content =
            toml::to_string_pretty(&self.config).map_err(ConfigError::SerializationError)?;

        std::fs::write(&self.config_path, config_content).map_err(ConfigError::IoError)?;

        Ok(())
    }
}
