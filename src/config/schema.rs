//! Configuration schema definitions.
//!
//! This module defines the structure of the configuration file using serde.
//! All configuration sections are defined here with appropriate defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session transport configuration
    pub server: ServerConfig,
    /// Device registry, asset root and port initialization
    pub bridge: BridgeConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface address or host name to bind to; names are resolved at bind time
    pub host: String,
    /// Port number for the websocket listener
    pub port: u16,
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Host and port for `TcpListener::bind`, which resolves host names.
    pub fn bind_target(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

/// Bridge configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// JSON file listing the MCU boards, in wire-ID order
    pub devices_file: PathBuf,
    /// Root directory served to the file commands (the sibling UI tree)
    pub asset_root: PathBuf,
    /// Pause between one port open completing and the next one starting
    pub open_delay_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            devices_file: PathBuf::from("devices.json"),
            asset_root: PathBuf::from("../ui"),
            open_delay_ms: 100,
        }
    }
}

impl BridgeConfig {
    /// Get the inter-open delay as Duration
    pub fn open_delay(&self) -> Duration {
        Duration::from_millis(self.open_delay_ms)
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    #[default]
    Pretty,
    /// Compact format
    Compact,
}
