//! Port abstraction layer for serial communication.
//!
//! Provides the `PortOpener` seam used by the port initializer, with a
//! tokio-serial backend for real hardware and an in-memory mock for tests.

pub mod async_port;
pub mod error;
pub mod mock;
pub mod traits;

pub use async_port::{available_port_names, TokioSerialOpener};
pub use error::PortError;
pub use mock::{MockPortOpener, OpenAttempt};
pub use traits::*;
