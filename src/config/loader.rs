//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::{Config, LogFormat};
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "MCU_BRIDGE";

/// Config file name
const CONFIG_FILE_NAME: &str = "bridge.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "MCU_BRIDGE_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `MCU_BRIDGE_CONFIG` environment variable (explicit path)
    /// 2. `./bridge.toml` (current directory)
    /// 3. The platform config directory (`~/.config/mcu-bridge/bridge.toml` on Linux)
    /// 4. Built-in defaults (no file required)
    ///
    /// Environment variables can override any config file values.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let mut config = if let Some(ref path) = config_path {
            load_from_file(path)?
        } else {
            Config::default()
        };

        apply_env_overrides(&mut config)?;
        validate(&config)?;

        Ok(Self { config_path, config })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;
        validate(&config)?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file).
    pub fn with_defaults() -> Self {
        let mut config = Config::default();
        // Still apply env overrides even with defaults
        let _ = apply_env_overrides(&mut config);

        Self {
            config_path: None,
            config,
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    // 1. Explicit environment variable
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. Current directory
    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    // 3. Platform config directory
    if let Some(app_config) = get_default_config_path() {
        if app_config.exists() {
            return Some(app_config);
        }
    }

    None
}

/// Get the default config directory for this application.
pub fn get_default_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "mcu-bridge").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the default config file path.
pub fn get_default_config_path() -> Option<PathBuf> {
    get_default_config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}

/// Load configuration from a file.
fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn validate(config: &Config) -> ConfigResult<()> {
    if config.bridge.devices_file.as_os_str().is_empty() {
        return Err(ConfigError::invalid("bridge.devices_file", "must not be empty"));
    }
    if config.server.host.trim().is_empty() {
        return Err(ConfigError::invalid("server.host", "must name an interface or host"));
    }
    Ok(())
}

/// Read `MCU_BRIDGE_<key>`, returning the variable name alongside its value.
fn env_override(key: &str) -> Option<(String, String)> {
    let var = format!("{}_{}", ENV_PREFIX, key);
    std::env::var(&var).ok().map(|value| (var, value))
}

/// Parse `MCU_BRIDGE_<key>` if it is set.
fn parse_override<T: std::str::FromStr>(
    key: &str,
    problem: &'static str,
) -> ConfigResult<Option<T>> {
    match env_override(key) {
        Some((var, value)) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::bad_override(var, value, problem)),
        None => Ok(None),
    }
}

/// Apply environment variable overrides to the configuration.
///
/// Environment variables follow the pattern: `MCU_BRIDGE_<SECTION>_<KEY>`
/// For example:
/// - `MCU_BRIDGE_SERVER_PORT=8080`
/// - `MCU_BRIDGE_BRIDGE_DEVICES_FILE=/etc/boards.json`
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    if let Some((_, host)) = env_override("SERVER_HOST") {
        config.server.host = host;
    }
    if let Some(port) = parse_override("SERVER_PORT", "expected a port number")? {
        config.server.port = port;
    }
    if let Some((_, level)) = env_override("SERVER_LOG_LEVEL") {
        config.server.log_level = level;
    }

    if let Some((_, file)) = env_override("BRIDGE_DEVICES_FILE") {
        config.bridge.devices_file = PathBuf::from(file);
    }
    if let Some((_, root)) = env_override("BRIDGE_ASSET_ROOT") {
        config.bridge.asset_root = PathBuf::from(root);
    }
    if let Some(delay) = parse_override("BRIDGE_OPEN_DELAY_MS", "expected milliseconds")? {
        config.bridge.open_delay_ms = delay;
    }

    if let Some((var, value)) = env_override("LOGGING_FORMAT") {
        config.logging.format = match value.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            _ => {
                return Err(ConfigError::bad_override(
                    var,
                    value,
                    "expected json, pretty or compact",
                ))
            }
        };
    }

    Ok(())
}
