//! MCU Bridge Library
//!
//! Bridges one websocket control session to a fixed, ordered set of
//! serial-connected microcontroller boards, plus a small file-transfer
//! command set against the UI asset tree.
//!
//! # Modules
//!
//! - `config`: Server configuration with TOML and environment overrides
//! - `registry`: The ordered device list; position is wire ID
//! - `port`: Serial port abstraction (tokio-serial and an in-memory mock)
//! - `device`: Per-device reader and writer tasks
//! - `initializer`: Sequential, failure-tolerant port opening
//! - `router`: Wire frame decoding and encoding
//! - `gateway`: File listing, reading and writing under the asset root
//! - `session`: The single current control session
//! - `bridge`: The event loop that owns all mutable state
//! - `transport`: The websocket endpoint
//! - `error`: Registry and routing errors
//! - `logging`: `tracing` subscriber setup

pub mod bridge;
pub mod config;
pub mod device;
pub mod error;
pub mod gateway;
pub mod initializer;
pub mod logging;
pub mod port;
pub mod registry;
pub mod router;
pub mod session;
pub mod transport;

// Re-export commonly used types for convenience
pub use bridge::{Bridge, Event};
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
pub use device::{DeviceHandle, DeviceId};
pub use error::{RegistryError, RouteError, RouteResult};
pub use gateway::FileGateway;
pub use initializer::{InitState, InitSummary, PortInitializer};
pub use port::{
    DataBits, MockPortOpener, Parity, PortError, PortOpener, PortSettings, StopBits,
    TokioSerialOpener,
};
pub use registry::{DeviceConfig, DeviceRegistry, DeviceState, OpenTarget};
pub use router::{decode, Command};
pub use session::{ConnectionManager, SessionHandle};
