//! The ordered device registry.
//!
//! Loaded once from a JSON device file. A device's position in the file is
//! its wire ID for the life of the process, so the registry never grows,
//! shrinks or reorders; only each entry's connection state changes.
//!
//! ```json
//! [
//!   { "deviceName": "Left arm",  "portName": "/dev/ttyACM0", "portSettings": "115200|8|1|none" },
//!   { "deviceName": "Right arm", "portName": "/dev/ttyACM1", "portSettings": "115200|8|1|none" }
//! ]
//! ```
//!
//! Any other field on a record (the legacy `port` handle included) is ignored.

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

use crate::device::{DeviceHandle, DeviceId};
use crate::error::RegistryError;
use crate::port::PortError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceRecord {
    device_name: String,
    port_name: String,
    port_settings: String,
}

/// Connection state of one device.
#[derive(Debug, Default)]
pub enum DeviceState {
    /// Not yet attempted.
    #[default]
    Pending,
    /// Open with live I/O tasks.
    Open(DeviceHandle),
    /// The single open attempt failed; the device stays unusable.
    Failed(String),
    /// Closed during shutdown.
    Closed,
}

impl DeviceState {
    fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Open(_) => "open",
            Self::Failed(_) => "failed",
            Self::Closed => "closed",
        }
    }
}

/// One configured MCU board.
#[derive(Debug)]
pub struct DeviceConfig {
    pub name: String,
    pub port_name: String,
    /// Raw `"<baud>|<dataBits>|<stopBits>|<parity>"` string; parsed when opened.
    pub settings: String,
    state: DeviceState,
}

impl DeviceConfig {
    pub fn new(
        name: impl Into<String>,
        port_name: impl Into<String>,
        settings: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            port_name: port_name.into(),
            settings: settings.into(),
            state: DeviceState::Pending,
        }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, DeviceState::Open(_))
    }

    /// Queue `data` for the device.
    ///
    /// Fails with `NotOpen` for a device that never opened; callers treat
    /// that as a silent per-device failure.
    pub fn write(&self, data: Vec<u8>) -> Result<(), PortError> {
        match self.state {
            DeviceState::Open(ref handle) => handle.write(data),
            _ => Err(PortError::NotOpen),
        }
    }
}

/// What the port initializer needs to open one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTarget {
    pub id: DeviceId,
    pub name: String,
    pub port_name: String,
    pub settings: String,
}

/// Fixed, ordered list of devices.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<DeviceConfig>,
}

impl DeviceRegistry {
    /// Registry with no devices.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the registry from a JSON device file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&content).map_err(|source| RegistryError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a registry from the contents of a device file.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<DeviceRecord> = serde_json::from_str(json)?;
        let devices = records
            .into_iter()
            .map(|r| DeviceConfig::new(r.device_name, r.port_name, r.port_settings))
            .collect();
        Ok(Self { devices })
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, id: DeviceId) -> Option<&DeviceConfig> {
        self.devices.get(id)
    }

    /// Devices paired with their wire IDs.
    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, &DeviceConfig)> {
        self.devices.iter().enumerate()
    }

    /// Snapshot of everything needed to open each device, in ID order.
    pub fn open_targets(&self) -> Vec<OpenTarget> {
        self.iter()
            .map(|(id, d)| OpenTarget {
                id,
                name: d.name.clone(),
                port_name: d.port_name.clone(),
                settings: d.settings.clone(),
            })
            .collect()
    }

    /// Record a successful open. Out-of-range IDs are ignored.
    pub fn install(&mut self, id: DeviceId, handle: DeviceHandle) {
        match self.devices.get_mut(id) {
            Some(device) => device.state = DeviceState::Open(handle),
            None => warn!(device = id, "Ignoring handle for unknown device"),
        }
    }

    /// Record a failed open.
    pub fn mark_failed(&mut self, id: DeviceId, reason: impl Into<String>) {
        if let Some(device) = self.devices.get_mut(id) {
            device.state = DeviceState::Failed(reason.into());
        }
    }

    /// Number of devices currently open.
    pub fn open_count(&self) -> usize {
        self.devices.iter().filter(|d| d.is_open()).count()
    }

    /// Close every open device. Devices that never opened are skipped.
    pub async fn close_all(&mut self) {
        for (id, device) in self.devices.iter_mut().enumerate() {
            if !device.is_open() {
                continue;
            }
            if let DeviceState::Open(handle) = std::mem::replace(&mut device.state, DeviceState::Closed) {
                debug!(device = id, port = %device.port_name, "Closing device");
                handle.close().await;
            }
        }
    }

    /// One status line per device: `"<id> <name> (<port>): <state>"`.
    pub fn describe(&self) -> Vec<String> {
        self.iter()
            .map(|(id, d)| {
                let mut line = format!("{} {} ({}): {}", id, d.name, d.port_name, d.state.label());
                if let DeviceState::Failed(ref reason) = d.state {
                    line.push_str(" - ");
                    line.push_str(reason);
                }
                line
            })
            .collect()
    }
}
