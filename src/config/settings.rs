//! Application settings and configuration management

use crate::player::{ControllerConfig, DEFAULT_QUEUE_CAPACITY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Application settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Maximum number of pending playback requests
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Interval between end-of-media checks, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Delay between repeats when none is given, in seconds
    #[serde(default)]
    pub default_delay_secs: f64,
    /// Repeat count when none is given
    #[serde(default = "default_repeat_count")]
    pub default_repeat_count: u32,
    /// Length of every track played by the simulated backend, in seconds
    #[serde(default = "default_simulated_track_secs")]
    pub simulated_track_secs: f64,
    /// Reject files that do not exist on disk
    #[serde(default = "default_require_existing_files")]
    pub require_existing_files: bool,
    /// Capacity of the controller event channel
    #[serde(default = "default_channel_capacity")]
    pub state_update_capacity: usize,
    /// Capacity of the controller command channel
    #[serde(default = "default_channel_capacity")]
    pub command_buffer_size: usize,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_repeat_count() -> u32 {
    1
}

fn default_simulated_track_secs() -> f64 {
    3.0
}

fn default_require_existing_files() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    32
}

/// Error types for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            queue_capacity: default_queue_capacity(),
            poll_interval_ms: default_poll_interval_ms(),
            default_delay_secs: 0.0,
            default_repeat_count: default_repeat_count(),
            simulated_track_secs: default_simulated_track_secs(),
            require_existing_files: default_require_existing_files(),
            state_update_capacity: default_channel_capacity(),
            command_buffer_size: default_channel_capacity(),
        }
    }
}

impl Settings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self)?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("r-cueplayer").join("config.json")
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::ValidationError("Queue capacity must be at least 1".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError("Poll interval must be greater than zero".to_string()));
        }
        if Duration::try_from_secs_f64(self.default_delay_secs).is_err() {
            return Err(ConfigError::ValidationError(
                "Default delay must be a non-negative number of seconds".to_string(),
            ));
        }
        if !matches!(Duration::try_from_secs_f64(self.simulated_track_secs), Ok(length) if !length.is_zero()) {
            return Err(ConfigError::ValidationError(
                "Simulated track length must be a positive number of seconds".to_string(),
            ));
        }
        if self.state_update_capacity == 0 || self.command_buffer_size == 0 {
            return Err(ConfigError::ValidationError("Channel capacities must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Controller tunables derived from these settings
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            queue_capacity: self.queue_capacity,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            state_update_capacity: self.state_update_capacity,
            command_buffer_size: self.command_buffer_size,
        }
    }

    /// Default inter-repeat delay as a `Duration`. Out-of-range values,
    /// which `validate` rejects, fall back to no delay.
    pub fn default_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.default_delay_secs).unwrap_or_default()
    }

    /// Simulated track length as a `Duration`. Out-of-range values fall back
    /// to the default length.
    pub fn simulated_track_length(&self) -> Duration {
        Duration::try_from_secs_f64(self.simulated_track_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_simulated_track_secs()))
    }
}
