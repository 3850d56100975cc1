//! Async serial port implementation using tokio-serial.
//!
//! Opens real OS serial ports as non-blocking streams registered with the
//! Tokio reactor.

use super::error::PortError;
use super::traits::{DeviceStream, PortOpener, PortSettings};
use async_trait::async_trait;

/// Opens OS serial ports through `tokio_serial`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSerialOpener;

impl TokioSerialOpener {
    /// Open a serial port with async I/O support.
    ///
    /// # Example
    /// ```no_run
    /// use mcu_bridge::port::{TokioSerialOpener, PortSettings};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let settings: PortSettings = "115200|8|1|none".parse()?;
    /// let stream = TokioSerialOpener::open_stream("/dev/ttyUSB0", &settings)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open_stream(
        port_name: &str,
        settings: &PortSettings,
    ) -> Result<tokio_serial::SerialStream, PortError> {
        let builder = tokio_serial::new(port_name, settings.baud_rate)
            .data_bits(settings.data_bits.into())
            .parity(settings.parity.into())
            .stop_bits(settings.stop_bits.into())
            .flow_control(tokio_serial::FlowControl::None);

        tokio_serial::SerialStream::open(&builder).map_err(|e| match e.kind {
            tokio_serial::ErrorKind::NoDevice => PortError::not_found(port_name),
            tokio_serial::ErrorKind::InvalidInput => PortError::config(e.to_string()),
            _ => PortError::Serial(e),
        })
    }
}

#[async_trait]
impl PortOpener for TokioSerialOpener {
    async fn open(
        &self,
        port_name: &str,
        settings: &PortSettings,
    ) -> Result<Box<dyn DeviceStream>, PortError> {
        let stream = Self::open_stream(port_name, settings)?;
        Ok(Box::new(stream))
    }
}

/// Names of the serial ports currently visible to the OS.
pub fn available_port_names() -> Result<Vec<String>, PortError> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
