//! Port-specific error types.
//!
//! Defines error types for serial port operations, separate from routing
//! errors so that a failed open stays a per-device concern.

use thiserror::Error;

/// Errors that can occur while opening or using a serial port.
#[derive(Debug, Error)]
pub enum PortError {
    /// The specified serial port was not found on the system.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Port configuration failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The settings string from the device file could not be parsed.
    #[error("Invalid port settings '{settings}': {reason}")]
    InvalidSettings { settings: String, reason: String },

    /// The device has no open connection.
    #[error("Port is not open")]
    NotOpen,

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create a NotFound error from a port name.
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    /// Create a Config error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an InvalidSettings error.
    pub fn invalid_settings(settings: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSettings {
            settings: settings.into(),
            reason: reason.into(),
        }
    }
}
