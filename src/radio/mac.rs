//! # IEEE 802.15.4 MAC Frame Model
//!
//! Addressing modes, addresses, the frame control field and the reusable
//! [`MacFrameTemplate`] describing outgoing data frames.

use crate::constants::{IEEE802154_BROADCAST_PAN_ID, IEEE802154_BROADCAST_SHORT_ADDRESS};
use crate::radio::driver::RadioConfig;
use std::fmt;

/// Addressing mode of a MAC address field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    None,
    Short16,
    Extended64,
}

impl AddressMode {
    /// Two-bit encoding used in the frame control field.
    pub fn fcf_bits(self) -> u16 {
        match self {
            AddressMode::None => 0b00,
            AddressMode::Short16 => 0b10,
            AddressMode::Extended64 => 0b11,
        }
    }

    /// Decodes the frame control field bits. The reserved value `0b01` has no
    /// address field and is treated as `None`.
    pub fn from_fcf_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b10 => AddressMode::Short16,
            0b11 => AddressMode::Extended64,
            _ => AddressMode::None,
        }
    }

    /// Size of the address field in bytes.
    pub fn address_len(self) -> usize {
        match self {
            AddressMode::None => 0,
            AddressMode::Short16 => 2,
            AddressMode::Extended64 => 8,
        }
    }
}

/// A MAC address together with its addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacAddress {
    None,
    Short(u16),
    Extended(u64),
}

impl MacAddress {
    pub const BROADCAST: MacAddress = MacAddress::Short(IEEE802154_BROADCAST_SHORT_ADDRESS);

    pub fn mode(&self) -> AddressMode {
        match self {
            MacAddress::None => AddressMode::None,
            MacAddress::Short(_) => AddressMode::Short16,
            MacAddress::Extended(_) => AddressMode::Extended64,
        }
    }

    pub fn is_broadcast(&self) -> bool {
        *self == MacAddress::BROADCAST
    }

    /// The address widened to 64 bits; `None` reads as zero.
    pub fn as_u64(&self) -> u64 {
        match *self {
            MacAddress::None => 0,
            MacAddress::Short(addr) => addr as u64,
            MacAddress::Extended(addr) => addr,
        }
    }

    /// Big-endian bytes as carried in serial API frames.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        match *self {
            MacAddress::None => Vec::new(),
            MacAddress::Short(addr) => addr.to_be_bytes().to_vec(),
            MacAddress::Extended(addr) => addr.to_be_bytes().to_vec(),
        }
    }

    /// Little-endian bytes as carried in the MAC header.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match *self {
            MacAddress::None => Vec::new(),
            MacAddress::Short(addr) => addr.to_le_bytes().to_vec(),
            MacAddress::Extended(addr) => addr.to_le_bytes().to_vec(),
        }
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacAddress::None => write!(f, "none"),
            MacAddress::Short(addr) => write!(f, "0x{addr:04X}"),
            MacAddress::Extended(addr) => write!(f, "0x{addr:016X}"),
        }
    }
}

/// MAC frame types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Beacon = 0,
    Data = 1,
    Ack = 2,
    MacCommand = 3,
}

impl FrameType {
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits & 0b111 {
            0 => Some(FrameType::Beacon),
            1 => Some(FrameType::Data),
            2 => Some(FrameType::Ack),
            3 => Some(FrameType::MacCommand),
            _ => None,
        }
    }
}

/// Frame control field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameControl {
    pub frame_type: FrameType,
    pub security_enabled: bool,
    pub frame_pending: bool,
    pub ack_required: bool,
    pub pan_id_compression: bool,
    pub destination_mode: AddressMode,
    pub frame_version: u8,
    pub source_mode: AddressMode,
}

impl FrameControl {
    pub fn to_bits(&self) -> u16 {
        (self.frame_type as u16)
            | (self.security_enabled as u16) << 3
            | (self.frame_pending as u16) << 4
            | (self.ack_required as u16) << 5
            | (self.pan_id_compression as u16) << 6
            | self.destination_mode.fcf_bits() << 10
            | ((self.frame_version & 0b11) as u16) << 12
            | self.source_mode.fcf_bits() << 14
    }

    pub fn from_bits(bits: u16) -> Option<Self> {
        Some(FrameControl {
            frame_type: FrameType::from_bits(bits)?,
            security_enabled: bits & (1 << 3) != 0,
            frame_pending: bits & (1 << 4) != 0,
            ack_required: bits & (1 << 5) != 0,
            pan_id_compression: bits & (1 << 6) != 0,
            destination_mode: AddressMode::from_fcf_bits(bits >> 10),
            frame_version: ((bits >> 12) & 0b11) as u8,
            source_mode: AddressMode::from_fcf_bits(bits >> 14),
        })
    }
}

/// The reusable description of an outgoing data frame.
///
/// The transmit path mutates it in place for every request. The addressing
/// modes in `fcf` always follow the address fields; use the setters to change
/// an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacFrameTemplate {
    pub fcf: FrameControl,
    pub sequence_number: u8,
    pub destination_pan_id: u16,
    destination: MacAddress,
    pub source_pan_id: u16,
    source: MacAddress,
}

impl MacFrameTemplate {
    /// Baseline template for this node: ack-requested data frames from our
    /// short address to the broadcast address on our PAN.
    pub fn from_config(config: &RadioConfig, pan_id_compression: bool) -> Self {
        let destination = MacAddress::BROADCAST;
        let source = MacAddress::Short(config.short_address);
        MacFrameTemplate {
            fcf: FrameControl {
                frame_type: FrameType::Data,
                security_enabled: false,
                frame_pending: false,
                ack_required: true,
                pan_id_compression,
                destination_mode: destination.mode(),
                frame_version: 0,
                source_mode: source.mode(),
            },
            sequence_number: 0,
            destination_pan_id: config.pan_id,
            destination,
            source_pan_id: config.pan_id,
            source,
        }
    }

    pub fn destination(&self) -> MacAddress {
        self.destination
    }

    pub fn source(&self) -> MacAddress {
        self.source
    }

    pub fn set_destination(&mut self, address: MacAddress) {
        self.destination = address;
        self.fcf.destination_mode = address.mode();
    }

    pub fn set_source(&mut self, address: MacAddress) {
        self.source = address;
        self.fcf.source_mode = address.mode();
    }

    pub fn ack_required(&self) -> bool {
        self.fcf.ack_required
    }

    /// True when the frame leaves for every node on every PAN reachable.
    pub fn is_broadcast(&self) -> bool {
        self.destination.is_broadcast() || self.destination_pan_id == IEEE802154_BROADCAST_PAN_ID
    }

    /// Serializes the MAC header (no payload, no FCS), little-endian.
    pub fn header_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(23);
        out.extend_from_slice(&self.fcf.to_bits().to_le_bytes());
        out.push(self.sequence_number);

        if self.destination.mode() != AddressMode::None {
            out.extend_from_slice(&self.destination_pan_id.to_le_bytes());
            out.extend_from_slice(&self.destination.to_le_bytes());
        }
        if self.source.mode() != AddressMode::None {
            let compressed =
                self.fcf.pan_id_compression && self.destination.mode() != AddressMode::None;
            if !compressed {
                out.extend_from_slice(&self.source_pan_id.to_le_bytes());
            }
            out.extend_from_slice(&self.source.to_le_bytes());
        }
        out
    }
}
