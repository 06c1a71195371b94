//! # Bee Error Handling
//!
//! This module defines the error types of the bee-rs crate: [`FrameError`] for
//! the API frame codec and [`BeeError`] for everything above it.

use crate::radio::driver::RadioError;
use thiserror::Error;

/// Errors raised while reading or writing a single API frame.
///
/// All of them are absorbed by the engine: the offending frame is dropped and
/// nothing is sent back to the host.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The header did not start with the API delimiter.
    #[error("Bad start delimiter: 0x{0:02X}")]
    BadDelimiter(u8),

    /// Payload sum plus checksum did not add up to 0xFF.
    #[error("Checksum mismatch: payload sum 0x{sum:02X}, checksum 0x{checksum:02X}")]
    ChecksumMismatch { sum: u8, checksum: u8 },

    /// The declared length does not fit the frame buffer.
    #[error("Frame length {length} exceeds buffer capacity {capacity}")]
    CapacityExceeded { length: usize, capacity: usize },

    /// The byte source ran out in the middle of a frame.
    #[error("Frame truncated")]
    Truncated,

    /// The underlying transport failed.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Represents the different error types that can occur in the bee-rs crate.
#[derive(Debug, Error)]
pub enum BeeError {
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Indicates an error related to the serial port communication.
    #[error("Serial port error: {0}")]
    SerialPortError(String),

    #[error("Radio error: {0}")]
    Radio(#[from] RadioError),

    /// A recognised command whose payload is shorter than its fixed layout.
    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
