//! # API Commands
//!
//! Typed views of inbound API frames. A frame payload is decoded once, at the
//! frame boundary, into a [`Command`]; nothing past this module deals with byte
//! offsets.

use crate::constants::*;
use crate::error::BeeError;
use crate::radio::mac::{AddressMode, MacAddress};
use bitflags::bitflags;
use nom::bytes::complete::take;
use nom::combinator::rest;
use nom::number::complete::{be_u16, be_u64, be_u8};
use nom::IResult;
use std::fmt;

/// API identifiers (payload byte 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiIdentifier {
    Transmit64,
    Transmit16,
    AtCommand,
    AtCommandQueue,
    RemoteAtRequest,
    LoopbackTest,
    Receive64,
    Receive16,
    ReceiveNone,
    AtResponse,
    TransmitStatus,
    RemoteAtResponse,
}

impl ApiIdentifier {
    pub fn from_byte(byte: u8) -> Option<Self> {
        let id = match byte {
            API_ID_TX_64 => ApiIdentifier::Transmit64,
            API_ID_TX_16 => ApiIdentifier::Transmit16,
            API_ID_AT_COMMAND => ApiIdentifier::AtCommand,
            API_ID_AT_COMMAND_QUEUE => ApiIdentifier::AtCommandQueue,
            API_ID_REMOTE_AT_REQUEST => ApiIdentifier::RemoteAtRequest,
            API_ID_LOOPBACK_TEST => ApiIdentifier::LoopbackTest,
            API_ID_RX_64 => ApiIdentifier::Receive64,
            API_ID_RX_16 => ApiIdentifier::Receive16,
            API_ID_RX_NONE => ApiIdentifier::ReceiveNone,
            API_ID_AT_RESPONSE => ApiIdentifier::AtResponse,
            API_ID_TX_STATUS => ApiIdentifier::TransmitStatus,
            API_ID_REMOTE_AT_RESPONSE => ApiIdentifier::RemoteAtResponse,
            _ => return None,
        };
        Some(id)
    }

    pub fn as_byte(self) -> u8 {
        match self {
            ApiIdentifier::Transmit64 => API_ID_TX_64,
            ApiIdentifier::Transmit16 => API_ID_TX_16,
            ApiIdentifier::AtCommand => API_ID_AT_COMMAND,
            ApiIdentifier::AtCommandQueue => API_ID_AT_COMMAND_QUEUE,
            ApiIdentifier::RemoteAtRequest => API_ID_REMOTE_AT_REQUEST,
            ApiIdentifier::LoopbackTest => API_ID_LOOPBACK_TEST,
            ApiIdentifier::Receive64 => API_ID_RX_64,
            ApiIdentifier::Receive16 => API_ID_RX_16,
            ApiIdentifier::ReceiveNone => API_ID_RX_NONE,
            ApiIdentifier::AtResponse => API_ID_AT_RESPONSE,
            ApiIdentifier::TransmitStatus => API_ID_TX_STATUS,
            ApiIdentifier::RemoteAtResponse => API_ID_REMOTE_AT_RESPONSE,
        }
    }

    /// Receive-packet identifier for a given source addressing mode.
    pub fn receive_for(mode: AddressMode) -> Self {
        match mode {
            AddressMode::Extended64 => ApiIdentifier::Receive64,
            AddressMode::Short16 => ApiIdentifier::Receive16,
            AddressMode::None => ApiIdentifier::ReceiveNone,
        }
    }
}

/// Two-letter AT command codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtCode {
    Write,
    RestoreDefaults,
    SoftwareReset,
    Channel,
    PanId,
    DestinationAddressHigh,
    DestinationAddressLow,
    SourceAddress16Bit,
    SerialNumberHigh,
    SerialNumberLow,
    Unknown(u16),
}

impl AtCode {
    pub fn from_u16(code: u16) -> Self {
        match code {
            AT_WR => AtCode::Write,
            AT_RE => AtCode::RestoreDefaults,
            AT_FR => AtCode::SoftwareReset,
            AT_CH => AtCode::Channel,
            AT_ID => AtCode::PanId,
            AT_DH => AtCode::DestinationAddressHigh,
            AT_DL => AtCode::DestinationAddressLow,
            AT_MY => AtCode::SourceAddress16Bit,
            AT_SH => AtCode::SerialNumberHigh,
            AT_SL => AtCode::SerialNumberLow,
            other => AtCode::Unknown(other),
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            AtCode::Write => AT_WR,
            AtCode::RestoreDefaults => AT_RE,
            AtCode::SoftwareReset => AT_FR,
            AtCode::Channel => AT_CH,
            AtCode::PanId => AT_ID,
            AtCode::DestinationAddressHigh => AT_DH,
            AtCode::DestinationAddressLow => AT_DL,
            AtCode::SourceAddress16Bit => AT_MY,
            AtCode::SerialNumberHigh => AT_SH,
            AtCode::SerialNumberLow => AT_SL,
            AtCode::Unknown(code) => code,
        }
    }

    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self::from_u16(u16::from_be_bytes(bytes))
    }

    pub fn to_bytes(self) -> [u8; 2] {
        self.as_u16().to_be_bytes()
    }
}

impl fmt::Display for AtCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [hi, lo] = self.to_bytes();
        if hi.is_ascii_graphic() && lo.is_ascii_graphic() {
            write!(f, "{}{}", hi as char, lo as char)
        } else {
            write!(f, "0x{:04X}", self.as_u16())
        }
    }
}

bitflags! {
    /// Options byte of a transmit request.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TransmitOptions: u8 {
        const DISABLE_ACK = TX_OPTION_DISABLE_ACK;
        const BROADCAST_PAN = TX_OPTION_BROADCAST_PAN;
    }
}

bitflags! {
    /// Options byte of a receive packet.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ReceiveOptions: u8 {
        const ADDRESS_BROADCAST = RX_OPTION_ADDRESS_BROADCAST;
        const PAN_BROADCAST = RX_OPTION_PAN_BROADCAST;
    }
}

/// A local AT command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtRequest<'a> {
    pub frame_id: u8,
    pub code: AtCode,
    /// Parameter value; empty for a read
    pub value: &'a [u8],
}

impl AtRequest<'_> {
    /// Payload bytes of this request, identifier included.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(AT_VALUE_OFFSET + self.value.len());
        payload.push(API_ID_AT_COMMAND);
        payload.push(self.frame_id);
        payload.extend_from_slice(&self.code.to_bytes());
        payload.extend_from_slice(self.value);
        payload
    }
}

/// A 16-bit or 64-bit addressed transmit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmitRequest<'a> {
    pub frame_id: u8,
    pub destination: MacAddress,
    pub options: TransmitOptions,
    pub data: &'a [u8],
}

impl TransmitRequest<'_> {
    pub fn address_mode(&self) -> AddressMode {
        self.destination.mode()
    }

    /// Offset of the first data byte within the request payload.
    pub fn data_offset(&self) -> usize {
        match self.address_mode() {
            AddressMode::Extended64 => TX64_DATA_OFFSET,
            _ => TX16_DATA_OFFSET,
        }
    }

    /// Payload bytes of this request, identifier included.
    pub fn to_payload(&self) -> Vec<u8> {
        let identifier = match self.address_mode() {
            AddressMode::Extended64 => API_ID_TX_64,
            _ => API_ID_TX_16,
        };
        let mut payload = Vec::with_capacity(self.data_offset() + self.data.len());
        payload.push(identifier);
        payload.push(self.frame_id);
        match self.destination {
            MacAddress::Extended(addr) => payload.extend_from_slice(&addr.to_be_bytes()),
            MacAddress::Short(addr) => payload.extend_from_slice(&addr.to_be_bytes()),
            MacAddress::None => payload.extend_from_slice(&[0, 0]),
        }
        payload.push(self.options.bits());
        payload.extend_from_slice(self.data);
        payload
    }
}

/// An inbound frame, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// AT command without a value
    AtRead(AtRequest<'a>),
    /// AT command carrying a value
    AtWrite(AtRequest<'a>),
    Transmit(TransmitRequest<'a>),
    /// Echo request; carries the whole payload
    Loopback(&'a [u8]),
    /// Identifier this engine does not serve; dropped silently
    Unhandled(u8),
}

fn at_request(input: &[u8]) -> IResult<&[u8], AtRequest<'_>> {
    let (input, frame_id) = be_u8(input)?;
    let (input, code) = be_u16(input)?;
    let (input, value) = rest(input)?;
    Ok((
        input,
        AtRequest {
            frame_id,
            code: AtCode::from_u16(code),
            value,
        },
    ))
}

fn transmit16(input: &[u8]) -> IResult<&[u8], TransmitRequest<'_>> {
    let (input, frame_id) = be_u8(input)?;
    let (input, address) = be_u16(input)?;
    let (input, options) = be_u8(input)?;
    let (input, data) = rest(input)?;
    Ok((
        input,
        TransmitRequest {
            frame_id,
            destination: MacAddress::Short(address),
            options: TransmitOptions::from_bits_retain(options),
            data,
        },
    ))
}

fn transmit64(input: &[u8]) -> IResult<&[u8], TransmitRequest<'_>> {
    let (input, frame_id) = be_u8(input)?;
    let (input, address) = be_u64(input)?;
    let (input, options) = be_u8(input)?;
    let (input, data) = rest(input)?;
    Ok((
        input,
        TransmitRequest {
            frame_id,
            destination: MacAddress::Extended(address),
            options: TransmitOptions::from_bits_retain(options),
            data,
        },
    ))
}

fn malformed(what: &str, payload: &[u8]) -> BeeError {
    BeeError::MalformedCommand(format!("{what}: {} bytes", payload.len()))
}

impl<'a> Command<'a> {
    /// Decodes a frame payload.
    ///
    /// Unknown identifiers decode to [`Command::Unhandled`]; only recognised
    /// commands that are too short for their layout are errors.
    pub fn parse(payload: &'a [u8]) -> Result<Self, BeeError> {
        let (&identifier, body) = payload
            .split_first()
            .ok_or_else(|| BeeError::MalformedCommand("empty frame".into()))?;

        let command = match ApiIdentifier::from_byte(identifier) {
            Some(ApiIdentifier::AtCommand) => {
                let (_, request) =
                    at_request(body).map_err(|_| malformed("AT command", payload))?;
                if payload.len() == AT_READ_FRAME_LENGTH {
                    Command::AtRead(request)
                } else {
                    Command::AtWrite(request)
                }
            }
            Some(ApiIdentifier::Transmit16) => {
                let (_, request) =
                    transmit16(body).map_err(|_| malformed("16-bit transmit request", payload))?;
                Command::Transmit(request)
            }
            Some(ApiIdentifier::Transmit64) => {
                let (_, request) =
                    transmit64(body).map_err(|_| malformed("64-bit transmit request", payload))?;
                Command::Transmit(request)
            }
            Some(ApiIdentifier::LoopbackTest) => Command::Loopback(payload),
            _ => Command::Unhandled(identifier),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_code_mnemonics() {
        assert_eq!(AtCode::from_bytes(*b"CH"), AtCode::Channel);
        assert_eq!(AtCode::from_bytes(*b"FR"), AtCode::SoftwareReset);
        assert_eq!(AtCode::from_u16(0x5858), AtCode::Unknown(0x5858));
        assert_eq!(AtCode::Channel.to_string(), "CH");
        assert_eq!(AtCode::Unknown(0x5858).to_string(), "XX");
        assert_eq!(AtCode::Unknown(0x0102).to_string(), "0x0102");
    }

    #[test]
    fn test_identifier_roundtrip() {
        for byte in 0..=255u8 {
            if let Some(id) = ApiIdentifier::from_byte(byte) {
                assert_eq!(id.as_byte(), byte);
            }
        }
    }

    #[test]
    fn test_parse_at_read_and_write() {
        let read = Command::parse(&[0x08, 0x01, b'C', b'H']).unwrap();
        assert_eq!(
            read,
            Command::AtRead(AtRequest {
                frame_id: 1,
                code: AtCode::Channel,
                value: &[],
            })
        );

        let write = Command::parse(&[0x08, 0x02, b'C', b'H', 0x0C]).unwrap();
        match write {
            Command::AtWrite(request) => {
                assert_eq!(request.code, AtCode::Channel);
                assert_eq!(request.value, &[0x0C]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_transmit16_offsets() {
        let payload = [0x01, 0x05, 0xAF, 0xFE, 0x01, 0xAA, 0xBB];
        let command = Command::parse(&payload).unwrap();
        let Command::Transmit(request) = command else {
            panic!("expected transmit");
        };
        assert_eq!(request.frame_id, payload[TX_FRAME_ID_OFFSET]);
        assert_eq!(request.destination, MacAddress::Short(0xAFFE));
        assert_eq!(request.options.bits(), payload[TX16_OPTIONS_OFFSET]);
        assert_eq!(request.data, &payload[TX16_DATA_OFFSET..]);
        assert_eq!(request.to_payload(), payload.to_vec());
    }

    #[test]
    fn test_parse_transmit64_offsets() {
        let payload = [
            0x00, 0x07, 0x00, 0x13, 0xA2, 0x00, 0x40, 0x0A, 0x01, 0x27, 0x04, 0x42,
        ];
        let Command::Transmit(request) = Command::parse(&payload).unwrap() else {
            panic!("expected transmit");
        };
        assert_eq!(request.frame_id, 0x07);
        assert_eq!(
            request.destination,
            MacAddress::Extended(0x0013_A200_400A_0127)
        );
        assert_eq!(request.options, TransmitOptions::BROADCAST_PAN);
        assert_eq!(request.data, &payload[TX64_DATA_OFFSET..]);
        assert_eq!(request.data_offset(), TX64_DATA_OFFSET);
        assert_eq!(request.to_payload(), payload.to_vec());
    }

    #[test]
    fn test_short_commands_are_malformed() {
        assert!(matches!(
            Command::parse(&[0x01, 0x05, 0xAF]),
            Err(BeeError::MalformedCommand(_))
        ));
        assert!(matches!(
            Command::parse(&[0x08, 0x01, b'C']),
            Err(BeeError::MalformedCommand(_))
        ));
        assert!(matches!(
            Command::parse(&[]),
            Err(BeeError::MalformedCommand(_))
        ));
    }

    #[test]
    fn test_unhandled_identifiers() {
        assert_eq!(
            Command::parse(&[0x09, 0x01, b'C', b'H']).unwrap(),
            Command::Unhandled(0x09)
        );
        assert_eq!(Command::parse(&[0x17]).unwrap(), Command::Unhandled(0x17));
        assert_eq!(Command::parse(&[0x55]).unwrap(), Command::Unhandled(0x55));
    }

    #[test]
    fn test_loopback_carries_whole_payload() {
        let payload = [0x44, 0x7E, 0x7D];
        assert_eq!(
            Command::parse(&payload).unwrap(),
            Command::Loopback(&payload)
        );
    }
}
