//! Core traits for serial port abstraction.
//!
//! Defines the `PortOpener` trait that allows both real serial ports and
//! in-memory mock devices to be used interchangeably, plus the line settings
//! parsed from the device file.

use super::error::PortError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::io::{AsyncRead, AsyncWrite};

/// Line settings for a device, parsed from `"<baud>|<dataBits>|<stopBits>|<parity>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSettings {
    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Number of data bits (5, 6, 7, or 8).
    pub data_bits: DataBits,

    /// Number of stop bits.
    pub stop_bits: StopBits,

    /// Parity checking mode.
    pub parity: Parity,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
        }
    }
}

impl FromStr for PortSettings {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split('|').map(str::trim).collect();
        let [baud, data_bits, stop_bits, parity] = fields.as_slice() else {
            return Err(PortError::invalid_settings(
                s,
                "expected <baud>|<dataBits>|<stopBits>|<parity>",
            ));
        };

        let baud_rate = match baud.parse::<u32>() {
            Ok(rate) if rate > 0 => rate,
            _ => return Err(PortError::invalid_settings(s, "baud rate must be a positive integer")),
        };

        let data_bits = match *data_bits {
            "5" => DataBits::Five,
            "6" => DataBits::Six,
            "7" => DataBits::Seven,
            "8" => DataBits::Eight,
            _ => return Err(PortError::invalid_settings(s, "data bits must be 5-8")),
        };

        let stop_bits = match *stop_bits {
            "1" => StopBits::One,
            "2" => StopBits::Two,
            _ => return Err(PortError::invalid_settings(s, "stop bits must be 1 or 2")),
        };

        let parity = match parity.to_ascii_lowercase().as_str() {
            "none" => Parity::None,
            "odd" => Parity::Odd,
            "even" => Parity::Even,
            _ => {
                return Err(PortError::invalid_settings(
                    s,
                    "parity must be none, odd or even",
                ))
            }
        };

        Ok(Self {
            baud_rate,
            data_bits,
            stop_bits,
            parity,
        })
    }
}

impl fmt::Display for PortSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = match self.data_bits {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        };
        let parity = match self.parity {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        write!(f, "{} {}{}{}", self.baud_rate, data, parity, stop)
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

/// Parity checking modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopBits {
    One,
    Two,
}

impl From<StopBits> for serialport::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        }
    }
}

/// A bidirectional byte stream to one device.
///
/// Implemented for anything that is `AsyncRead + AsyncWrite`, so both
/// `tokio_serial::SerialStream` and `tokio::io::DuplexStream` qualify.
pub trait DeviceStream: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> DeviceStream for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

/// Opens device connections by OS port name.
#[async_trait]
pub trait PortOpener: Send + Sync {
    /// Open the named port with the given line settings.
    async fn open(
        &self,
        port_name: &str,
        settings: &PortSettings,
    ) -> Result<Box<dyn DeviceStream>, PortError>;
}
