//! # Receive Event Adapter
//!
//! Converts radio events into outbound API frames. The adapter composes into its
//! own frame buffer, never the one used for command responses, and appends the
//! encoded wire bytes to a pending queue the foreground loop writes out.
//!
//! ## Receive packet layout
//! ```text
//! 0x80 | source (8 bytes) | RSSI | options | data
//! 0x81 | source (2 bytes) | RSSI | options | data
//! 0x82 |                    RSSI | options | data
//! ```

use crate::api::command::{ApiIdentifier, ReceiveOptions};
use crate::api::frame::{encode_into, ApiFrame};
use crate::constants::{API_ID_TX_STATUS, IEEE802154_BROADCAST_PAN_ID, TX_STATUS_SUCCESS};
use crate::error::FrameError;
use crate::radio::driver::{RadioEventHandler, ReceivedDataFrame};
use bytes::BytesMut;
use log::{debug, trace, warn};

pub struct ReceiveAdapter {
    buffer: ApiFrame,
    pending: BytesMut,
}

impl ReceiveAdapter {
    pub fn new(capacity: usize) -> Self {
        ReceiveAdapter {
            buffer: ApiFrame::with_capacity(capacity),
            pending: BytesMut::new(),
        }
    }

    /// Composes a receive packet for `frame` and queues its wire form.
    pub fn build_receive_frame(&mut self, frame: &ReceivedDataFrame) -> Result<(), FrameError> {
        let mut options = ReceiveOptions::empty();
        if frame.destination.is_broadcast() {
            options |= ReceiveOptions::ADDRESS_BROADCAST;
        }
        if frame.destination_pan_id == IEEE802154_BROADCAST_PAN_ID {
            options |= ReceiveOptions::PAN_BROADCAST;
        }

        let identifier = ApiIdentifier::receive_for(frame.source.mode());
        self.buffer.clear();
        self.buffer.push(identifier.as_byte())?;
        self.buffer.extend_from_slice(&frame.source.to_be_bytes())?;
        self.buffer.push(frame.rssi_dbm.unsigned_abs())?;
        self.buffer.push(options.bits())?;
        self.buffer.extend_from_slice(&frame.payload)?;
        self.queue_buffer()
    }

    /// Composes a transmit status for an acknowledged sequence number.
    pub fn build_transmit_status(&mut self, sequence_number: u8) -> Result<(), FrameError> {
        self.buffer.clear();
        self.buffer.extend_from_slice(&[API_ID_TX_STATUS, sequence_number, TX_STATUS_SUCCESS])?;
        self.queue_buffer()
    }

    fn queue_buffer(&mut self) -> Result<(), FrameError> {
        self.buffer.seal();
        encode_into(self.buffer.payload(), &mut self.pending)
    }

    /// The most recently composed frame.
    pub fn last_frame(&self) -> &ApiFrame {
        &self.buffer
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Wire bytes waiting to go out, oldest first.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Drops the pending bytes once they are written.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

}

impl RadioEventHandler for ReceiveAdapter {
    fn on_data_frame(&mut self, frame: ReceivedDataFrame) {
        debug!(
            "Data frame from {} ({} dBm), {} bytes",
            frame.source,
            frame.rssi_dbm,
            frame.payload.len()
        );
        if let Err(e) = self.build_receive_frame(&frame) {
            warn!("Received data frame dropped: {}", e);
        }
    }

    fn on_ack_frame(&mut self, sequence_number: u8) {
        debug!("Ack for seq {}", sequence_number);
        if let Err(e) = self.build_transmit_status(sequence_number) {
            warn!("Transmit status dropped: {}", e);
        }
    }

    fn on_beacon_frame(&mut self, payload: &[u8]) {
        trace!("Beacon frame ignored ({} bytes)", payload.len());
    }

    fn on_mac_command_frame(&mut self, payload: &[u8]) {
        trace!("MAC command frame ignored ({} bytes)", payload.len());
    }

    fn on_crc_error(&mut self) {
        trace!("Radio CRC error");
    }
}
