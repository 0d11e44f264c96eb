//! Run loop configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::Size;

/// Longest accepted frame or poll interval, in milliseconds
pub const MAX_INTERVAL_MS: u64 = 60_000;

/// Run loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target time between frames in milliseconds
    pub frame_interval_ms: u64,
    /// Capacity of the input event queue
    pub event_queue_capacity: usize,
    /// How long the input listener blocks on its source per poll, in
    /// milliseconds
    pub poll_interval_ms: u64,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Headless terminal settings
    pub headless: HeadlessConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            event_queue_capacity: 256,
            poll_interval_ms: 10,
            log_filter: "warn".to_string(),
            headless: HeadlessConfig::default(),
        }
    }
}

/// Headless terminal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    /// Width in columns
    pub columns: u16,
    /// Height in rows
    pub rows: u16,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            columns: 80,
            rows: 24,
        }
    }
}

impl HeadlessConfig {
    pub fn size(&self) -> Size {
        Size::new(self.columns, self.rows)
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from the default location or return default config
    pub fn load_or_default() -> Self {
        let Some(path) = default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring {}: {}", path.display(), e);
                Self::default()
            },
        }
    }

    /// Check every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_interval_ms == 0 || self.frame_interval_ms > MAX_INTERVAL_MS {
            return Err(ConfigError::Invalid(format!(
                "frame_interval_ms must be between 1 and {}, got {}",
                MAX_INTERVAL_MS, self.frame_interval_ms
            )));
        }
        if self.event_queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event_queue_capacity must be positive".into(),
            ));
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms > MAX_INTERVAL_MS {
            return Err(ConfigError::Invalid(format!(
                "poll_interval_ms must be between 1 and {}, got {}",
                MAX_INTERVAL_MS, self.poll_interval_ms
            )));
        }
        if self.headless.columns == 0 || self.headless.rows == 0 {
            return Err(ConfigError::Invalid(format!(
                "headless size must be non-empty, got {}",
                self.headless.size()
            )));
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// `$HOME/.config/tamboui/config.json`
pub fn default_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("tamboui")
            .join("config.json")
    })
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
