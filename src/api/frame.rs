//! # API Frame Codec
//!
//! This module decodes and encodes the framed, byte-stuffed and checksummed units
//! exchanged with the host over the serial link.
//!
//! ## Wire format
//! ```text
//! 0x7E | length (u16, big-endian) | payload (escaped) | checksum (escaped)
//! ```
//! `length` counts logical payload bytes. Any of `0x7E 0x7D 0x11 0x13` inside the
//! payload or checksum is sent as `0x7D, byte ^ 0x20`. The checksum is
//! `0xFF - (sum of payload bytes mod 256)`.
//!
//! ## Usage
//! ```rust
//! use bee_rs::api::frame::{decode_wire, encode};
//!
//! let wire = encode(&[0x08, 0x01, b'C', b'H']).unwrap();
//! assert_eq!(&wire[..], &[0x7E, 0x00, 0x04, 0x08, 0x01, 0x43, 0x48, 0x6B]);
//!
//! let frame = decode_wire(&wire, 100).unwrap();
//! assert_eq!(frame.payload(), &[0x08, 0x01, b'C', b'H']);
//! ```

use crate::constants::{
    API_CHECKSUM_TARGET, API_ESCAPE, API_ESCAPE_XOR, API_HEADER_SIZE, API_RESERVED_BYTES,
    API_START_DELIMITER,
};
use crate::error::FrameError;
use bytes::{BufMut, BytesMut};
use nom::number::complete::{be_u16, be_u8};
use nom::IResult;

/// A pull-based source of raw wire bytes.
///
/// Reads block until a byte is available; the codec never buffers beyond the
/// frame it is decoding.
pub trait ByteSource {
    fn next_byte(&mut self) -> Result<u8, FrameError>;
}

impl ByteSource for &[u8] {
    fn next_byte(&mut self) -> Result<u8, FrameError> {
        let (&byte, rest) = self.split_first().ok_or(FrameError::Truncated)?;
        *self = rest;
        Ok(byte)
    }
}

/// The fixed-size header read ahead of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub delimiter: u8,
    pub length: u16,
}

impl FrameHeader {
    pub fn new(length: u16) -> Self {
        FrameHeader {
            delimiter: API_START_DELIMITER,
            length,
        }
    }

    pub fn from_bytes(bytes: [u8; API_HEADER_SIZE]) -> Self {
        FrameHeader {
            delimiter: bytes[0],
            length: u16::from_be_bytes([bytes[1], bytes[2]]),
        }
    }

    /// Uses `nom` to read the header from the front of a wire buffer.
    pub fn parse(input: &[u8]) -> IResult<&[u8], FrameHeader> {
        let (input, delimiter) = be_u8(input)?;
        let (input, length) = be_u16(input)?;
        Ok((input, FrameHeader { delimiter, length }))
    }

    pub fn validate(&self) -> Result<(), FrameError> {
        if self.delimiter != API_START_DELIMITER {
            return Err(FrameError::BadDelimiter(self.delimiter));
        }
        Ok(())
    }
}

/// A bounded API frame buffer.
///
/// The capacity is fixed when the buffer is created; the payload never grows
/// beyond it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFrame {
    payload: Vec<u8>,
    capacity: usize,
    checksum: u8,
}

impl ApiFrame {
    pub fn with_capacity(capacity: usize) -> Self {
        ApiFrame {
            payload: Vec::with_capacity(capacity),
            capacity,
            checksum: API_CHECKSUM_TARGET,
        }
    }

    /// Builds a frame around an existing payload, sized to fit it exactly.
    pub fn from_payload(payload: &[u8]) -> Self {
        ApiFrame {
            payload: payload.to_vec(),
            capacity: payload.len(),
            checksum: calculate_checksum(payload),
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Number of payload bytes, as carried in the header.
    pub fn length(&self) -> u16 {
        self.payload.len() as u16
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// The API identifier byte, if any payload is present.
    pub fn identifier(&self) -> Option<u8> {
        self.payload.first().copied()
    }

    pub fn clear(&mut self) {
        self.payload.clear();
        self.checksum = API_CHECKSUM_TARGET;
    }

    pub fn push(&mut self, byte: u8) -> Result<(), FrameError> {
        if self.payload.len() >= self.capacity {
            return Err(FrameError::CapacityExceeded {
                length: self.payload.len() + 1,
                capacity: self.capacity,
            });
        }
        self.payload.push(byte);
        Ok(())
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<(), FrameError> {
        let length = self.payload.len() + bytes.len();
        if length > self.capacity {
            return Err(FrameError::CapacityExceeded {
                length,
                capacity: self.capacity,
            });
        }
        self.payload.extend_from_slice(bytes);
        Ok(())
    }

    /// Recomputes the checksum over the current payload.
    pub fn seal(&mut self) {
        self.checksum = calculate_checksum(&self.payload);
    }
}

/// Returns true for bytes that must be escaped on the wire.
pub fn is_reserved(byte: u8) -> bool {
    API_RESERVED_BYTES.contains(&byte)
}

/// Sum of the logical payload bytes, mod 256.
pub fn payload_sum(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// Calculates the checksum transmitted after `payload`.
pub fn calculate_checksum(payload: &[u8]) -> u8 {
    API_CHECKSUM_TARGET.wrapping_sub(payload_sum(payload))
}

/// Verifies `checksum` against `payload`.
pub fn verify_checksum(payload: &[u8], checksum: u8) -> Result<(), FrameError> {
    let sum = payload_sum(payload);
    if sum.wrapping_add(checksum) != API_CHECKSUM_TARGET {
        return Err(FrameError::ChecksumMismatch { sum, checksum });
    }
    Ok(())
}

fn next_unescaped<S: ByteSource + ?Sized>(source: &mut S) -> Result<u8, FrameError> {
    let byte = source.next_byte()?;
    if byte == API_ESCAPE {
        return Ok(source.next_byte()? ^ API_ESCAPE_XOR);
    }
    Ok(byte)
}

/// Decodes one frame body into `frame`.
///
/// The header has already been read by the caller. Frames declaring more
/// payload than `frame` can hold are rejected before any payload byte is
/// consumed.
pub fn decode<S: ByteSource + ?Sized>(
    header: FrameHeader,
    source: &mut S,
    frame: &mut ApiFrame,
) -> Result<(), FrameError> {
    header.validate()?;

    let length = header.length as usize;
    if length > frame.capacity() {
        return Err(FrameError::CapacityExceeded {
            length,
            capacity: frame.capacity(),
        });
    }

    frame.clear();
    for _ in 0..length {
        let byte = next_unescaped(source)?;
        frame.push(byte)?;
    }

    let checksum = next_unescaped(source)?;
    verify_checksum(frame.payload(), checksum)?;
    frame.checksum = checksum;
    Ok(())
}

/// Reads past the body and checksum of a frame without storing them.
///
/// Used after [`decode`] refused a frame, so the next read starts on a header.
pub fn skip_body<S: ByteSource + ?Sized>(
    header: FrameHeader,
    source: &mut S,
) -> Result<(), FrameError> {
    for _ in 0..=header.length {
        next_unescaped(source)?;
    }
    Ok(())
}

/// Decodes a complete wire frame, header included.
pub fn decode_wire(wire: &[u8], capacity: usize) -> Result<ApiFrame, FrameError> {
    let (mut rest, header) = FrameHeader::parse(wire).map_err(|_| FrameError::Truncated)?;
    let mut frame = ApiFrame::with_capacity(capacity);
    decode(header, &mut rest, &mut frame)?;
    Ok(frame)
}

fn put_escaped(out: &mut BytesMut, byte: u8) {
    if is_reserved(byte) {
        out.put_u8(API_ESCAPE);
        out.put_u8(byte ^ API_ESCAPE_XOR);
    } else {
        out.put_u8(byte);
    }
}

/// Appends the wire form of `payload` to `out`.
///
/// The header is written unescaped; payload bytes and the checksum are escaped.
pub fn encode_into(payload: &[u8], out: &mut BytesMut) -> Result<(), FrameError> {
    let length = u16::try_from(payload.len()).map_err(|_| FrameError::CapacityExceeded {
        length: payload.len(),
        capacity: u16::MAX as usize,
    })?;

    out.reserve(API_HEADER_SIZE + payload.len() * 2 + 2);
    out.put_u8(API_START_DELIMITER);
    out.put_u16(length);

    let mut sum: u8 = 0;
    for &byte in payload {
        sum = sum.wrapping_add(byte);
        put_escaped(out, byte);
    }
    put_escaped(out, API_CHECKSUM_TARGET.wrapping_sub(sum));
    Ok(())
}

/// Encodes `payload` into a fresh wire buffer.
pub fn encode(payload: &[u8]) -> Result<BytesMut, FrameError> {
    let mut out = BytesMut::with_capacity(API_HEADER_SIZE + payload.len() + 1);
    encode_into(payload, &mut out)?;
    Ok(out)
}
