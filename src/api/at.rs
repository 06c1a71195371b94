//! # AT Parameter Engine
//!
//! Answers local AT commands from a table mapping each [`AtCode`] to a getter
//! and an optional setter. The table is built once at start-up and never changes
//! while the engine runs.
//!
//! ## Response layout
//! ```text
//! 0x88 | frame id | code (2 bytes) | status | value (0, 1, 2 or 4 bytes, big-endian)
//! ```

use crate::api::command::{AtCode, AtRequest};
use crate::api::frame::ApiFrame;
use crate::constants::*;
use crate::error::FrameError;
use crate::radio::driver::RadioConfig;
use crate::radio::mac::MacFrameTemplate;
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Status byte of an AT response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AtStatus {
    Ok = AT_STATUS_OK,
    Error = AT_STATUS_ERROR,
    InvalidCommand = AT_STATUS_INVALID_COMMAND,
    InvalidParameter = AT_STATUS_INVALID_PARAMETER,
}

impl AtStatus {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            AT_STATUS_OK => Some(AtStatus::Ok),
            AT_STATUS_ERROR => Some(AtStatus::Error),
            AT_STATUS_INVALID_COMMAND => Some(AtStatus::InvalidCommand),
            AT_STATUS_INVALID_PARAMETER => Some(AtStatus::InvalidParameter),
            _ => None,
        }
    }
}

/// A parameter value as returned by a getter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtValue {
    None,
    U8(u8),
    U16(u16),
    U32(u32),
}

impl AtValue {
    fn write_to(self, frame: &mut ApiFrame) -> Result<(), FrameError> {
        match self {
            AtValue::None => Ok(()),
            AtValue::U8(v) => frame.push(v),
            AtValue::U16(v) => frame.extend_from_slice(&v.to_be_bytes()),
            AtValue::U32(v) => frame.extend_from_slice(&v.to_be_bytes()),
        }
    }
}

/// Read-only state visible to getters.
#[derive(Debug, Clone, Copy)]
pub struct AtContext<'a> {
    pub radio: &'a RadioConfig,
    pub template: &'a MacFrameTemplate,
}

/// Mutable state handed to setters.
#[derive(Debug)]
pub struct AtTarget<'a> {
    pub radio: &'a mut RadioConfig,
    pub template: &'a mut MacFrameTemplate,
}

pub type AtGetter = fn(&AtContext<'_>) -> AtValue;

/// Applies a raw big-endian value. An `Err` is sent back as the status byte.
pub type AtSetter = fn(&mut AtTarget<'_>, &[u8]) -> Result<(), AtStatus>;

#[derive(Clone, Copy)]
pub struct AtEntry {
    pub get: AtGetter,
    pub set: Option<AtSetter>,
}

impl fmt::Debug for AtEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtEntry")
            .field("writable", &self.set.is_some())
            .finish()
    }
}

/// What the engine must do once the response has been sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtAction {
    None,
    SoftwareReset,
}

fn no_value(_: &AtContext<'_>) -> AtValue {
    AtValue::None
}

fn channel(ctx: &AtContext<'_>) -> AtValue {
    AtValue::U8(ctx.radio.channel)
}

fn pan_id(ctx: &AtContext<'_>) -> AtValue {
    AtValue::U16(ctx.radio.pan_id)
}

fn destination_high(ctx: &AtContext<'_>) -> AtValue {
    AtValue::U32((ctx.template.destination().as_u64() >> 32) as u32)
}

fn destination_low(ctx: &AtContext<'_>) -> AtValue {
    AtValue::U32(ctx.template.destination().as_u64() as u32)
}

fn short_address(ctx: &AtContext<'_>) -> AtValue {
    AtValue::U16(ctx.radio.short_address)
}

fn serial_high(ctx: &AtContext<'_>) -> AtValue {
    AtValue::U32((ctx.radio.extended_address >> 32) as u32)
}

fn serial_low(ctx: &AtContext<'_>) -> AtValue {
    AtValue::U32(ctx.radio.extended_address as u32)
}

/// The AT parameter table.
#[derive(Debug, Clone, Default)]
pub struct AtParameterTable {
    entries: HashMap<AtCode, AtEntry>,
}

impl AtParameterTable {
    /// The standard read table; no code is writable.
    pub fn standard() -> Self {
        let getters: [(AtCode, AtGetter); 10] = [
            (AtCode::Write, no_value),
            (AtCode::RestoreDefaults, no_value),
            (AtCode::SoftwareReset, no_value),
            (AtCode::Channel, channel),
            (AtCode::PanId, pan_id),
            (AtCode::DestinationAddressHigh, destination_high),
            (AtCode::DestinationAddressLow, destination_low),
            (AtCode::SourceAddress16Bit, short_address),
            (AtCode::SerialNumberHigh, serial_high),
            (AtCode::SerialNumberLow, serial_low),
        ];

        let entries = getters
            .into_iter()
            .map(|(code, get)| (code, AtEntry { get, set: None }))
            .collect();
        AtParameterTable { entries }
    }

    /// Starts from the standard table.
    pub fn builder() -> AtTableBuilder {
        AtTableBuilder {
            table: Self::standard(),
        }
    }

    pub fn lookup(&self, code: AtCode) -> Option<&AtEntry> {
        self.entries.get(&code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds an [`AtParameterTable`] before the engine starts.
#[derive(Debug)]
pub struct AtTableBuilder {
    table: AtParameterTable,
}

impl AtTableBuilder {
    /// Adds or replaces the getter of `code`.
    pub fn getter(mut self, code: AtCode, get: AtGetter) -> Self {
        self.table
            .entries
            .entry(code)
            .and_modify(|entry| entry.get = get)
            .or_insert(AtEntry { get, set: None });
        self
    }

    /// Makes `code` writable. A code without a getter reads back no value.
    pub fn setter(mut self, code: AtCode, set: AtSetter) -> Self {
        self.table
            .entries
            .entry(code)
            .and_modify(|entry| entry.set = Some(set))
            .or_insert(AtEntry {
                get: no_value,
                set: Some(set),
            });
        self
    }

    pub fn build(self) -> AtParameterTable {
        self.table
    }
}

/// Table used when the engine is not given one.
pub static DEFAULT_AT_TABLE: Lazy<AtParameterTable> = Lazy::new(AtParameterTable::standard);

fn begin_response(
    response: &mut ApiFrame,
    request: &AtRequest<'_>,
    status: AtStatus,
) -> Result<(), FrameError> {
    response.clear();
    response.push(API_ID_AT_RESPONSE)?;
    response.push(request.frame_id)?;
    response.extend_from_slice(&request.code.to_bytes())?;
    response.push(status as u8)
}

/// Answers an AT read into `response`.
///
/// Unknown codes answer [`AtStatus::InvalidCommand`] with no value. `FR`
/// answers `Ok` and asks the caller to reset once the response is out.
pub fn read_parameter(
    table: &AtParameterTable,
    request: &AtRequest<'_>,
    ctx: &AtContext<'_>,
    response: &mut ApiFrame,
) -> Result<AtAction, FrameError> {
    let Some(entry) = table.lookup(request.code) else {
        debug!("AT {} read: unknown command", request.code);
        begin_response(response, request, AtStatus::InvalidCommand)?;
        response.seal();
        return Ok(AtAction::None);
    };

    let value = (entry.get)(ctx);
    begin_response(response, request, AtStatus::Ok)?;
    value.write_to(response)?;
    response.seal();
    debug!("AT {} read: {:?}", request.code, value);

    if request.code == AtCode::SoftwareReset {
        return Ok(AtAction::SoftwareReset);
    }
    Ok(AtAction::None)
}

/// Applies an AT write.
///
/// Codes without a setter consume the frame and produce nothing; returns
/// whether `response` holds a reply to send.
pub fn set_parameter(
    table: &AtParameterTable,
    request: &AtRequest<'_>,
    target: &mut AtTarget<'_>,
    response: &mut ApiFrame,
) -> Result<bool, FrameError> {
    let Some(set) = table.lookup(request.code).and_then(|entry| entry.set) else {
        debug!(
            "AT {} write ignored ({} value bytes)",
            request.code,
            request.value.len()
        );
        return Ok(false);
    };

    let status = match set(target, request.value) {
        Ok(()) => AtStatus::Ok,
        Err(status) => status,
    };
    debug!("AT {} write: {:?}", request.code, status);

    begin_response(response, request, status)?;
    response.seal();
    Ok(true)
}
