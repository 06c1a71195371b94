//! # UART Transport
//!
//! The engine reaches the host through [`UartTransport`]: a non-blocking poll for
//! a complete frame header, a blocking byte source for the frame body, and a
//! write path for outbound frames. [`SerialUart`] implements it over a real
//! serial port opened with `tokio-serial`.

use crate::api::frame::ByteSource;
use crate::constants::{API_HEADER_SIZE, DEFAULT_BAUDRATE};
use crate::error::{BeeError, FrameError};
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};
use std::time::Duration;

/// Host-side link of the engine.
pub trait UartTransport: ByteSource {
    /// Returns the next frame header once all of its bytes have arrived.
    ///
    /// Never blocks; `Ok(None)` means keep polling.
    fn poll_header(&mut self) -> Result<Option<[u8; API_HEADER_SIZE]>, BeeError>;

    /// Writes a complete wire frame.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), BeeError>;
}

/// Configuration for serial connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub port: String,
    pub baudrate: u32,
    /// How long a frame body may stall before the frame is dropped
    pub timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            port: "/dev/ttyUSB0".to_string(),
            baudrate: DEFAULT_BAUDRATE,
            timeout_ms: 100,
        }
    }
}

impl SerialConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// A serial port in 8N1 mode.
pub struct SerialUart {
    port: Box<dyn tokio_serial::SerialPort>,
}

impl SerialUart {
    /// Opens the port named in `config`.
    pub fn open(config: &SerialConfig) -> Result<Self, BeeError> {
        let port = tokio_serial::new(config.port.as_str(), config.baudrate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(config.timeout())
            .open()
            .map_err(|e| BeeError::SerialPortError(e.to_string()))?;

        Ok(SerialUart { port })
    }

    /// Wraps a port opened elsewhere.
    pub fn from_port(port: Box<dyn tokio_serial::SerialPort>) -> Self {
        SerialUart { port }
    }

    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl ByteSource for SerialUart {
    fn next_byte(&mut self) -> Result<u8, FrameError> {
        let mut byte = [0u8; 1];
        match self.port.read_exact(&mut byte) {
            Ok(()) => Ok(byte[0]),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Err(FrameError::Truncated),
            Err(e) => Err(FrameError::Transport(e.to_string())),
        }
    }
}

impl UartTransport for SerialUart {
    fn poll_header(&mut self) -> Result<Option<[u8; API_HEADER_SIZE]>, BeeError> {
        let available = self
            .port
            .bytes_to_read()
            .map_err(|e| BeeError::SerialPortError(e.to_string()))?;
        if (available as usize) < API_HEADER_SIZE {
            return Ok(None);
        }

        let mut header = [0u8; API_HEADER_SIZE];
        self.port
            .read_exact(&mut header)
            .map_err(|e| BeeError::SerialPortError(e.to_string()))?;
        Ok(Some(header))
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), BeeError> {
        self.port
            .write_all(bytes)
            .map_err(|e| BeeError::SerialPortError(e.to_string()))?;
        self.port
            .flush()
            .map_err(|e| BeeError::SerialPortError(e.to_string()))
    }
}
