//! # Utility Modules
//!
//! Hex formatting and logging helpers shared by the engine and the harness.

pub mod hex;
pub mod logging;

pub use hex::{decode_hex, encode_hex, format_hex_compact, parse_hex_lenient, HexError};
pub use logging::{log_frame_hex, span_frame_processing, LogThrottle};
