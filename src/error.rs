//! Error types for loading the device registry and routing session frames.
//!
//! None of these are fatal. A registry error leaves the bridge running with
//! zero devices; routing errors become plain text reports on the session.

use std::path::PathBuf;
use thiserror::Error;

/// The device file could not be loaded.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Missing or unreadable device file
    #[error("Failed to read device file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Device file is not a JSON array of device records
    #[error("Failed to parse device file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A session frame that could not be carried out.
///
/// The `Display` output is the text line sent back to the session.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The frame addressed a device index outside the registry.
    #[error("Bad device ID: {token} (have {count} devices)")]
    BadDeviceId { token: String, count: usize },

    /// The frame's token is neither a device index nor a known command.
    #[error("Bad command: {0}")]
    UnknownCommand(String),

    /// A file gateway operation failed.
    #[error("{action} '{path}' failed: {source}")]
    FileOperation {
        action: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl RouteError {
    /// Create a FileOperation error.
    pub fn file(action: &'static str, path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileOperation {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Result of a routing step.
pub type RouteResult<T> = Result<T, RouteError>;

pub(crate) fn bad_device(token: &str, count: usize) -> RouteError {
    RouteError::BadDeviceId {
        token: token.to_string(),
        count,
    }
}
