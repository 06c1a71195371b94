//! API Frame Protocol Constants
//!
//! This module defines the wire-level constants of the XBee-compatible API mode
//! and the IEEE 802.15.4 MAC values the engine fills into outgoing frames.

// ----------------------------------------------------------------------------
// Framing
// ----------------------------------------------------------------------------

/// Start-of-frame delimiter
pub const API_START_DELIMITER: u8 = 0x7E;

/// Escape marker; the following byte is XOR-ed with [`API_ESCAPE_XOR`]
pub const API_ESCAPE: u8 = 0x7D;

/// Software flow control bytes, escaped like the delimiter
pub const API_XON: u8 = 0x11;
pub const API_XOFF: u8 = 0x13;

pub const API_ESCAPE_XOR: u8 = 0x20;

/// Bytes that never appear raw inside payload or checksum
pub const API_RESERVED_BYTES: [u8; 4] = [API_START_DELIMITER, API_ESCAPE, API_XON, API_XOFF];

/// Delimiter plus big-endian 16-bit length
pub const API_HEADER_SIZE: usize = 3;

/// Payload sum plus checksum must equal this value (mod 256)
pub const API_CHECKSUM_TARGET: u8 = 0xFF;

// ----------------------------------------------------------------------------
// API identifiers (payload byte 0)
// ----------------------------------------------------------------------------

pub const API_ID_TX_64: u8 = 0x00;
pub const API_ID_TX_16: u8 = 0x01;
pub const API_ID_AT_COMMAND: u8 = 0x08;
pub const API_ID_AT_COMMAND_QUEUE: u8 = 0x09;
pub const API_ID_REMOTE_AT_REQUEST: u8 = 0x17;
pub const API_ID_LOOPBACK_TEST: u8 = 0x44;
pub const API_ID_RX_64: u8 = 0x80;
pub const API_ID_RX_16: u8 = 0x81;
pub const API_ID_RX_NONE: u8 = 0x82;
pub const API_ID_AT_RESPONSE: u8 = 0x88;
pub const API_ID_TX_STATUS: u8 = 0x89;
pub const API_ID_REMOTE_AT_RESPONSE: u8 = 0x97;

// ----------------------------------------------------------------------------
// AT commands
// ----------------------------------------------------------------------------

pub const AT_WR: u16 = u16::from_be_bytes(*b"WR");
pub const AT_RE: u16 = u16::from_be_bytes(*b"RE");
pub const AT_FR: u16 = u16::from_be_bytes(*b"FR");
pub const AT_CH: u16 = u16::from_be_bytes(*b"CH");
pub const AT_ID: u16 = u16::from_be_bytes(*b"ID");
pub const AT_DH: u16 = u16::from_be_bytes(*b"DH");
pub const AT_DL: u16 = u16::from_be_bytes(*b"DL");
pub const AT_MY: u16 = u16::from_be_bytes(*b"MY");
pub const AT_SH: u16 = u16::from_be_bytes(*b"SH");
pub const AT_SL: u16 = u16::from_be_bytes(*b"SL");

/// AT command frame layout: identifier, frame id, two code bytes, optional value
pub const AT_FRAME_ID_OFFSET: usize = 1;
pub const AT_CODE_OFFSET: usize = 2;
pub const AT_VALUE_OFFSET: usize = 4;

/// Length of an AT command frame carrying no value (a parameter read)
pub const AT_READ_FRAME_LENGTH: usize = AT_VALUE_OFFSET;

// AT response status codes
pub const AT_STATUS_OK: u8 = 0x00;
pub const AT_STATUS_ERROR: u8 = 0x01;
pub const AT_STATUS_INVALID_COMMAND: u8 = 0x02;
pub const AT_STATUS_INVALID_PARAMETER: u8 = 0x03;

// ----------------------------------------------------------------------------
// Transmit requests
// ----------------------------------------------------------------------------

pub const TX_FRAME_ID_OFFSET: usize = 1;
pub const TX_ADDRESS_OFFSET: usize = 2;

pub const TX16_OPTIONS_OFFSET: usize = 4;
pub const TX16_DATA_OFFSET: usize = 5;

pub const TX64_OPTIONS_OFFSET: usize = 10;
pub const TX64_DATA_OFFSET: usize = 11;

// Transmit option masks
pub const TX_OPTION_DISABLE_ACK: u8 = 0x01;
pub const TX_OPTION_BROADCAST_PAN: u8 = 0x04;

// Receive option masks
pub const RX_OPTION_ADDRESS_BROADCAST: u8 = 0x02;
pub const RX_OPTION_PAN_BROADCAST: u8 = 0x04;

// Transmit status codes
pub const TX_STATUS_SUCCESS: u8 = 0x00;

// ----------------------------------------------------------------------------
// IEEE 802.15.4
// ----------------------------------------------------------------------------

pub const IEEE802154_BROADCAST_PAN_ID: u16 = 0xFFFF;
pub const IEEE802154_BROADCAST_SHORT_ADDRESS: u16 = 0xFFFF;

/// Largest PSDU the PHY carries, FCS included
pub const IEEE802154_MAX_PHY_PACKET_SIZE: usize = 127;
pub const IEEE802154_FCS_SIZE: usize = 2;

pub const IEEE802154_MIN_CHANNEL: u8 = 11;
pub const IEEE802154_MAX_CHANNEL: u8 = 26;

// ----------------------------------------------------------------------------
// Defaults
// ----------------------------------------------------------------------------

pub const DEFAULT_CHANNEL: u8 = 25;
pub const DEFAULT_PAN_ID: u16 = 0xAFFE;
pub const DEFAULT_SHORT_ADDRESS: u16 = 0x0033;
pub const DEFAULT_EXTENDED_ADDRESS: u64 = 0x0012_4B00_0000_0033;

/// Payload capacity of each API frame buffer
pub const DEFAULT_BUFFER_CAPACITY: usize = 100;

/// Smallest usable buffer: an AT response carrying a 4-byte value
pub const MIN_BUFFER_CAPACITY: usize = 16;

pub const DEFAULT_BAUDRATE: u32 = 57600;
pub const DEFAULT_EVENT_QUEUE_DEPTH: usize = 16;
