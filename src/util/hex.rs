//! # Hex Utilities
//!
//! Hex formatting for frame dumps in logs and the command line harness, and
//! lenient parsing of hex the user types (`7E 00 04`, `7e:00:04`, `7E0004`).
//!
//! ```rust
//! use bee_rs::util::hex::{format_hex_compact, parse_hex_lenient};
//!
//! let bytes = parse_hex_lenient("7E 00:04").unwrap();
//! assert_eq!(bytes, vec![0x7E, 0x00, 0x04]);
//! assert_eq!(format_hex_compact(&bytes), "7E 00 04");
//! ```

use thiserror::Error;

/// Errors that can occur during hex operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("Odd number of hex digits: {0}")]
    OddLength(usize),

    #[error("Empty hex string")]
    EmptyString,

    #[error("Hex decoding error: {0}")]
    DecodeError(String),
}

/// Encode bytes to an uppercase hex string without separators
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode_upper(data)
}

/// Decode a hex string; whitespace is ignored.
pub fn decode_hex(hex_str: &str) -> Result<Vec<u8>, HexError> {
    let cleaned: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(HexError::EmptyString);
    }
    if cleaned.len() % 2 != 0 {
        return Err(HexError::OddLength(cleaned.len()));
    }
    hex::decode(&cleaned).map_err(|e| HexError::DecodeError(e.to_string()))
}

/// Like [`decode_hex`], but any non-hex character acts as a separator.
pub fn parse_hex_lenient(input: &str) -> Result<Vec<u8>, HexError> {
    let digits: String = input.chars().filter(|c| c.is_ascii_hexdigit()).collect();
    decode_hex(&digits)
}

/// Formats data as "7E 00 04" for logs.
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
