//! # Radio Layer Interface
//!
//! This module defines the [`RadioLayer`] trait the engine transmits through and
//! the [`RadioEventHandler`] callbacks the radio delivers from interrupt context.
//! Channel access, retransmission and the PHY itself live behind these traits.

use crate::constants::{
    DEFAULT_CHANNEL, DEFAULT_EXTENDED_ADDRESS, DEFAULT_PAN_ID, DEFAULT_SHORT_ADDRESS,
};
use crate::radio::mac::{MacAddress, MacFrameTemplate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Common radio layer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RadioError {
    /// Radio is in wrong state for operation
    #[error("Radio busy")]
    Busy,
    /// MAC header plus payload do not fit a PHY packet
    #[error("Payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: usize },
    /// Device-specific error
    #[error("Device error: {0}")]
    DeviceError(String),
}

/// Radio settings of this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    /// IEEE 802.15.4 channel, 11 through 26
    pub channel: u8,
    pub pan_id: u16,
    pub short_address: u16,
    pub extended_address: u64,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL,
            pan_id: DEFAULT_PAN_ID,
            short_address: DEFAULT_SHORT_ADDRESS,
            extended_address: DEFAULT_EXTENDED_ADDRESS,
        }
    }
}

/// Transmit side of the radio.
pub trait RadioLayer {
    /// Hands one data frame to the radio.
    ///
    /// Returns once the frame has been queued for the air. Delivery status is
    /// reported later through [`RadioEventHandler::on_ack_frame`].
    fn send_data_frame(
        &mut self,
        template: &MacFrameTemplate,
        payload: &[u8],
    ) -> Result<(), RadioError>;
}

impl<R: RadioLayer + ?Sized> RadioLayer for Box<R> {
    fn send_data_frame(
        &mut self,
        template: &MacFrameTemplate,
        payload: &[u8],
    ) -> Result<(), RadioError> {
        (**self).send_data_frame(template, payload)
    }
}

/// A data frame received over the air.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedDataFrame {
    pub source: MacAddress,
    pub destination: MacAddress,
    pub destination_pan_id: u16,
    /// Signal strength in dBm
    pub rssi_dbm: i8,
    pub payload: Vec<u8>,
}

/// Events raised by the radio layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioEvent {
    DataReceived(ReceivedDataFrame),
    AckReceived { sequence_number: u8 },
    BeaconReceived { payload: Vec<u8> },
    MacCommandReceived { payload: Vec<u8> },
    CrcError,
}

impl RadioEvent {
    /// Delivers the event to the matching callback of `handler`.
    pub fn deliver<H: RadioEventHandler + ?Sized>(self, handler: &mut H) {
        match self {
            RadioEvent::DataReceived(frame) => handler.on_data_frame(frame),
            RadioEvent::AckReceived { sequence_number } => handler.on_ack_frame(sequence_number),
            RadioEvent::BeaconReceived { payload } => handler.on_beacon_frame(&payload),
            RadioEvent::MacCommandReceived { payload } => handler.on_mac_command_frame(&payload),
            RadioEvent::CrcError => handler.on_crc_error(),
        }
    }
}

/// Receive callbacks of the radio layer.
pub trait RadioEventHandler {
    fn on_data_frame(&mut self, frame: ReceivedDataFrame);
    fn on_ack_frame(&mut self, sequence_number: u8);
    fn on_beacon_frame(&mut self, payload: &[u8]);
    fn on_mac_command_frame(&mut self, payload: &[u8]);
    fn on_crc_error(&mut self);
}
