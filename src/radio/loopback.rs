//! # Loopback Radio
//!
//! A simulated [`RadioLayer`] for the harness binary and tests. It records every
//! frame handed to it, acknowledges frames that ask for an ack, and can echo
//! each payload back as if the addressed node had answered.

use crate::constants::{IEEE802154_FCS_SIZE, IEEE802154_MAX_PHY_PACKET_SIZE};
use crate::radio::driver::{RadioError, RadioEvent, RadioLayer, ReceivedDataFrame};
use crate::radio::irq::RadioIrqHandle;
use crate::radio::mac::{MacAddress, MacFrameTemplate};
use log::debug;

/// Signal strength reported for echoed frames
pub const LOOPBACK_RSSI_DBM: i8 = -40;

/// A frame as it left the MAC layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentFrame {
    pub sequence_number: u8,
    pub ack_required: bool,
    pub destination: MacAddress,
    pub destination_pan_id: u16,
    /// Serialized MAC header
    pub header: Vec<u8>,
    pub payload: Vec<u8>,
}

pub struct LoopbackRadio {
    irq: RadioIrqHandle,
    sent: Vec<SentFrame>,
    echo: bool,
}

impl LoopbackRadio {
    pub fn new(irq: RadioIrqHandle) -> Self {
        LoopbackRadio {
            irq,
            sent: Vec::new(),
            echo: false,
        }
    }

    /// Also deliver each sent payload back as a received data frame.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn sent(&self) -> &[SentFrame] {
        &self.sent
    }

    pub fn take_sent(&mut self) -> Vec<SentFrame> {
        std::mem::take(&mut self.sent)
    }
}

impl RadioLayer for LoopbackRadio {
    fn send_data_frame(
        &mut self,
        template: &MacFrameTemplate,
        payload: &[u8],
    ) -> Result<(), RadioError> {
        let header = template.header_bytes();
        let len = header.len() + payload.len() + IEEE802154_FCS_SIZE;
        if len > IEEE802154_MAX_PHY_PACKET_SIZE {
            return Err(RadioError::PayloadTooLarge {
                len,
                max: IEEE802154_MAX_PHY_PACKET_SIZE,
            });
        }

        let destination = template.destination();
        debug!(
            "Loopback radio: seq {} to {} on PAN 0x{:04X}, {} bytes",
            template.sequence_number,
            destination,
            template.destination_pan_id,
            payload.len()
        );
        self.sent.push(SentFrame {
            sequence_number: template.sequence_number,
            ack_required: template.ack_required(),
            destination,
            destination_pan_id: template.destination_pan_id,
            header,
            payload: payload.to_vec(),
        });

        if template.ack_required() && !destination.is_broadcast() {
            self.irq.queue_event(RadioEvent::AckReceived {
                sequence_number: template.sequence_number,
            });
        }
        if self.echo {
            self.irq
                .queue_event(RadioEvent::DataReceived(ReceivedDataFrame {
                    source: destination,
                    destination: template.source(),
                    destination_pan_id: template.destination_pan_id,
                    rssi_dbm: LOOPBACK_RSSI_DBM,
                    payload: payload.to_vec(),
                }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::driver::RadioConfig;
    use crate::radio::irq::RadioEventQueue;

    fn template() -> MacFrameTemplate {
        MacFrameTemplate::from_config(&RadioConfig::default(), true)
    }

    #[test]
    fn test_unicast_is_acked() {
        let mut queue = RadioEventQueue::new(4);
        let mut radio = LoopbackRadio::new(queue.handle());
        let mut template = template();
        template.sequence_number = 5;
        template.set_destination(MacAddress::Short(0x1234));

        radio.send_data_frame(&template, &[0xAA]).unwrap();
        assert_eq!(radio.sent().len(), 1);
        assert_eq!(radio.sent()[0].payload, vec![0xAA]);
        assert_eq!(
            queue.try_next(),
            Some(RadioEvent::AckReceived { sequence_number: 5 })
        );
    }

    #[test]
    fn test_broadcast_is_not_acked() {
        let mut queue = RadioEventQueue::new(4);
        let mut radio = LoopbackRadio::new(queue.handle());
        radio.send_data_frame(&template(), &[0xAA]).unwrap();
        assert_eq!(queue.try_next(), None);
    }

    #[test]
    fn test_echo() {
        let mut queue = RadioEventQueue::new(4);
        let mut radio = LoopbackRadio::new(queue.handle()).with_echo(true);
        let mut template = template();
        template.fcf.ack_required = false;
        template.set_destination(MacAddress::Short(0xAFFE));

        radio.send_data_frame(&template, &[1, 2]).unwrap();
        match queue.try_next() {
            Some(RadioEvent::DataReceived(frame)) => {
                assert_eq!(frame.source, MacAddress::Short(0xAFFE));
                assert_eq!(frame.payload, vec![1, 2]);
                assert_eq!(frame.rssi_dbm, LOOPBACK_RSSI_DBM);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_oversized_payload() {
        let queue = RadioEventQueue::new(4);
        let mut radio = LoopbackRadio::new(queue.handle());
        let result = radio.send_data_frame(&template(), &[0u8; 120]);
        assert!(matches!(result, Err(RadioError::PayloadTooLarge { .. })));
        assert!(radio.sent().is_empty());
    }
}
