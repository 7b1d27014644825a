//! Configuration management
//!
//! Loads configuration from config.toml at startup. The analytic
//! parameters (window span, capacities, lag bounds) are compile-time
//! constants in `core`; the config covers the deployment-variable
//! surface: feed endpoint, output directories, durability and logging.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Engine configuration
///
/// Loaded from config.toml at startup; a missing file yields defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Websocket feed settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Output data settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Diagnostic logging settings
    #[serde(default)]
    pub logging: LogConfig,
}

/// Websocket feed configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    /// OKX public websocket endpoint
    #[serde(default = "default_ws_url")]
    pub url: String,

    /// Seconds between keep-alive pings on an idle connection
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

/// Output data configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory for trade logs and metric CSVs
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Sync every record write to disk (durable but slower)
    #[serde(default)]
    pub fsync_per_write: bool,
}

/// Diagnostic logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Directory for diagnostic log files
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    /// Default tracing filter (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_ws_url(),
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            fsync_per_write: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            level: default_log_level(),
        }
    }
}

fn default_ws_url() -> String {
    "wss://ws.okx.com:8443/ws/v5/public".to_string()
}

fn default_ping_interval_secs() -> u64 {
    25 // OKX closes connections idle for 30s
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the config.toml file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// # Errors
    /// Returns error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => {
                let config: Config = toml::from_str(&contents)
                    .map_err(|e| ConfigError::Parse(e.to_string()))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(ConfigError::Io(e)),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),
}
