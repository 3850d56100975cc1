//! Configuration module for the MCU bridge.
//!
//! This module provides TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of priority):
//!
//! 1. `--config <path>` on the command line
//! 2. `MCU_BRIDGE_CONFIG` environment variable (explicit path)
//! 3. `./bridge.toml` (current directory)
//! 4. The platform config directory (`~/.config/mcu-bridge/bridge.toml` on Linux)
//! 5. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! Any configuration value can be overridden via environment variables.
//! The pattern is: `MCU_BRIDGE_<SECTION>_<KEY>`
//!
//! Examples:
//! - `MCU_BRIDGE_SERVER_PORT=8080`
//! - `MCU_BRIDGE_BRIDGE_ASSET_ROOT=/srv/ui`
//! - `MCU_BRIDGE_LOGGING_FORMAT=json`
//!
//! The device list itself is not part of this file; it lives in the JSON
//! file named by `bridge.devices_file` (see [`crate::registry`]).

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    get_default_config_dir, get_default_config_path, resolve_config_path, ConfigLoader,
};
pub use schema::{BridgeConfig, Config, LogFormat, LoggingConfig, ServerConfig};
