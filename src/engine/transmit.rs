//! # Transmit Path
//!
//! Turns a transmit request into a radio send. The long-lived
//! [`MacFrameTemplate`] takes the request's sequence number and destination; the
//! ack-required flag and destination PAN ID may be overridden for a single send
//! and are put back by [`TemplateOverride`] on every exit path.

use crate::api::command::{TransmitOptions, TransmitRequest};
use crate::constants::IEEE802154_BROADCAST_PAN_ID;
use crate::radio::driver::{RadioError, RadioLayer};
use crate::radio::mac::MacFrameTemplate;
use log::debug;
use std::ops::{Deref, DerefMut};

/// Borrow of the template whose per-send overrides are undone on drop.
pub struct TemplateOverride<'a> {
    template: &'a mut MacFrameTemplate,
    ack_required: bool,
    destination_pan_id: u16,
}

impl<'a> TemplateOverride<'a> {
    pub fn new(template: &'a mut MacFrameTemplate) -> Self {
        let ack_required = template.fcf.ack_required;
        let destination_pan_id = template.destination_pan_id;
        TemplateOverride {
            template,
            ack_required,
            destination_pan_id,
        }
    }

    pub fn disable_ack(&mut self) {
        self.template.fcf.ack_required = false;
    }

    pub fn broadcast_pan(&mut self) {
        self.template.destination_pan_id = IEEE802154_BROADCAST_PAN_ID;
    }

    /// Applies the override bits of a transmit options byte.
    pub fn apply(&mut self, options: TransmitOptions) {
        if options.contains(TransmitOptions::DISABLE_ACK) {
            self.disable_ack();
        }
        if options.contains(TransmitOptions::BROADCAST_PAN) {
            self.broadcast_pan();
        }
    }
}

impl Deref for TemplateOverride<'_> {
    type Target = MacFrameTemplate;

    fn deref(&self) -> &MacFrameTemplate {
        self.template
    }
}

impl DerefMut for TemplateOverride<'_> {
    fn deref_mut(&mut self) -> &mut MacFrameTemplate {
        self.template
    }
}

impl Drop for TemplateOverride<'_> {
    fn drop(&mut self) {
        self.template.fcf.ack_required = self.ack_required;
        self.template.destination_pan_id = self.destination_pan_id;
    }
}

/// Owns the MAC template and the radio it transmits through.
pub struct TransmitPath<R> {
    template: MacFrameTemplate,
    radio: R,
}

impl<R: RadioLayer> TransmitPath<R> {
    pub fn new(template: MacFrameTemplate, radio: R) -> Self {
        TransmitPath { template, radio }
    }

    /// Sends the data of `request` to its destination.
    ///
    /// Sequence number and destination address stay in the template afterwards;
    /// ack-required and destination PAN ID are restored whatever the radio
    /// returns.
    pub fn send(&mut self, request: &TransmitRequest<'_>) -> Result<(), RadioError> {
        self.template.sequence_number = request.frame_id;
        self.template.set_destination(request.destination);

        let mut template = TemplateOverride::new(&mut self.template);
        template.apply(request.options);
        debug!(
            "Transmit seq {} to {} (ack {}, PAN 0x{:04X}), {} bytes",
            template.sequence_number,
            request.destination,
            template.ack_required(),
            template.destination_pan_id,
            request.data.len()
        );

        self.radio.send_data_frame(&template, request.data)
    }

    pub fn template(&self) -> &MacFrameTemplate {
        &self.template
    }

    pub fn template_mut(&mut self) -> &mut MacFrameTemplate {
        &mut self.template
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// Splits into the template and the radio.
    pub fn parts_mut(&mut self) -> (&mut MacFrameTemplate, &mut R) {
        (&mut self.template, &mut self.radio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::driver::RadioConfig;
    use crate::radio::mac::{AddressMode, MacAddress};

    /// Records the template as the radio saw it.
    #[derive(Default)]
    struct RecordingRadio {
        seen: Vec<(MacFrameTemplate, Vec<u8>)>,
        fail: bool,
    }

    impl RadioLayer for RecordingRadio {
        fn send_data_frame(
            &mut self,
            template: &MacFrameTemplate,
            payload: &[u8],
        ) -> Result<(), RadioError> {
            self.seen.push((template.clone(), payload.to_vec()));
            if self.fail {
                return Err(RadioError::Busy);
            }
            Ok(())
        }
    }

    fn path() -> TransmitPath<RecordingRadio> {
        let template = MacFrameTemplate::from_config(&RadioConfig::default(), true);
        TransmitPath::new(template, RecordingRadio::default())
    }

    fn request(options: TransmitOptions) -> TransmitRequest<'static> {
        TransmitRequest {
            frame_id: 0x42,
            destination: MacAddress::Short(0xAFFE),
            options,
            data: &[0xDE, 0xAD],
        }
    }

    #[test]
    fn test_disable_ack_is_restored() {
        let mut path = path();
        assert!(path.template().ack_required());

        path.send(&request(TransmitOptions::DISABLE_ACK)).unwrap();

        let (seen, payload) = &path.radio().seen[0];
        assert!(!seen.ack_required());
        assert_eq!(payload, &vec![0xDE, 0xAD]);
        assert!(path.template().ack_required());
    }

    #[test]
    fn test_broadcast_pan_is_restored() {
        let mut path = path();
        let pan = path.template().destination_pan_id;

        path.send(&request(TransmitOptions::BROADCAST_PAN)).unwrap();

        assert_eq!(path.radio().seen[0].0.destination_pan_id, 0xFFFF);
        assert_eq!(path.template().destination_pan_id, pan);
    }

    #[test]
    fn test_restore_after_radio_error() {
        let mut path = path();
        path.radio_mut().fail = true;
        let result = path.send(&request(TransmitOptions::all()));
        assert_eq!(result, Err(RadioError::Busy));
        assert!(path.template().ack_required());
        assert_eq!(path.template().destination_pan_id, 0xAFFE);
    }

    #[test]
    fn test_sequence_and_destination_persist() {
        let mut path = path();
        let request = TransmitRequest {
            frame_id: 9,
            destination: MacAddress::Extended(0x0013_A200_400A_0127),
            options: TransmitOptions::empty(),
            data: &[],
        };
        path.send(&request).unwrap();
        assert_eq!(path.template().sequence_number, 9);
        assert_eq!(path.template().fcf.destination_mode, AddressMode::Extended64);
        assert_eq!(
            path.template().destination(),
            MacAddress::Extended(0x0013_A200_400A_0127)
        );
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let mut template = MacFrameTemplate::from_config(&RadioConfig::default(), true);
        {
            let mut guard = TemplateOverride::new(&mut template);
            guard.disable_ack();
            guard.broadcast_pan();
            guard.sequence_number = 3;
            assert!(!guard.ack_required());
        }
        assert!(template.ack_required());
        assert_eq!(template.destination_pan_id, 0xAFFE);
        assert_eq!(template.sequence_number, 3);
    }
}
