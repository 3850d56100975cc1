//! Errors raised while resolving the bridge configuration.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Cannot read bridge config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`Config`](super::Config).
    #[error("Bridge config '{path}' is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A resolved value is unusable, e.g. an empty device file path.
    #[error("Bridge config key '{key}' {problem}")]
    Invalid { key: &'static str, problem: String },

    /// An `MCU_BRIDGE_*` override could not be parsed.
    #[error("Environment override {var}={value:?} rejected: {problem}")]
    Override {
        var: String,
        value: String,
        problem: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, problem: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            problem: problem.into(),
        }
    }

    pub(crate) fn bad_override(var: String, value: String, problem: &'static str) -> Self {
        Self::Override {
            var,
            value,
            problem,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
