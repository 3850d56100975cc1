//! Mock port opener for testing.
//!
//! Provides a `MockPortOpener` that hands out in-memory duplex streams
//! instead of OS serial handles. The far end of each stream is kept so a
//! test can play the part of the firmware: read what the bridge wrote and
//! write lines back.

use super::error::PortError;
use super::traits::{DeviceStream, PortOpener, PortSettings};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::DuplexStream;

/// Buffer size of each in-memory device link.
const MOCK_BUFFER_SIZE: usize = 4096;

/// One recorded open attempt.
#[derive(Debug, Clone)]
pub struct OpenAttempt {
    /// The port name that was requested.
    pub port_name: String,
    /// The settings passed to the opener.
    pub settings: PortSettings,
    /// When the attempt started.
    pub started: Instant,
    /// Whether the attempt succeeded.
    pub succeeded: bool,
}

#[derive(Debug, Default)]
struct MockOpenerState {
    /// Port names whose open should fail.
    failing: HashSet<String>,
    /// Firmware-side ends of successfully opened links.
    devices: HashMap<String, DuplexStream>,
    /// Every open attempt, in order.
    attempts: Vec<OpenAttempt>,
}

/// Mock port opener implementation for testing.
///
/// # Example
/// ```
/// use mcu_bridge::port::{MockPortOpener, PortOpener, PortSettings};
///
/// # async fn example() {
/// let opener = MockPortOpener::new();
/// opener.fail_port("/dev/ttyACM1");
///
/// assert!(opener.open("/dev/ttyACM0", &PortSettings::default()).await.is_ok());
/// assert!(opener.open("/dev/ttyACM1", &PortSettings::default()).await.is_err());
///
/// let firmware_end = opener.take_device("/dev/ttyACM0").unwrap();
/// # drop(firmware_end);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockPortOpener {
    state: Arc<Mutex<MockOpenerState>>,
}

impl MockPortOpener {
    /// Create a mock opener where every port opens successfully.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent opens of `port_name` fail with `NotFound`.
    pub fn fail_port(&self, port_name: impl Into<String>) {
        self.state.lock().failing.insert(port_name.into());
    }

    /// Take the firmware-side end of an opened port.
    ///
    /// Returns `None` if the port was never opened or was already taken.
    pub fn take_device(&self, port_name: &str) -> Option<DuplexStream> {
        self.state.lock().devices.remove(port_name)
    }

    /// All open attempts recorded so far, in order.
    pub fn attempts(&self) -> Vec<OpenAttempt> {
        self.state.lock().attempts.clone()
    }
}

#[async_trait]
impl PortOpener for MockPortOpener {
    async fn open(
        &self,
        port_name: &str,
        settings: &PortSettings,
    ) -> Result<Box<dyn DeviceStream>, PortError> {
        let mut state = self.state.lock();
        let succeeded = !state.failing.contains(port_name);

        state.attempts.push(OpenAttempt {
            port_name: port_name.to_string(),
            settings: *settings,
            started: Instant::now(),
            succeeded,
        });

        if !succeeded {
            return Err(PortError::not_found(port_name));
        }

        let (bridge_end, firmware_end) = tokio::io::duplex(MOCK_BUFFER_SIZE);
        state.devices.insert(port_name.to_string(), firmware_end);
        Ok(Box::new(bridge_end))
    }
}
