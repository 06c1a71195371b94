//! Shared fixtures for the engine integration tests.
#![allow(dead_code)]

use bee_rs::api::frame::{decode_wire, encode, ApiFrame};
use bee_rs::api::serial_mock::MockUart;
use bee_rs::config::BeeConfig;
use bee_rs::engine::{Engine, NoopWatchdog};
use bee_rs::radio::{LoopbackRadio, RadioEventQueue, RadioIrqHandle};

pub type TestEngine = Engine<MockUart, LoopbackRadio, NoopWatchdog>;

pub struct Harness {
    pub uart: MockUart,
    pub irq: RadioIrqHandle,
    pub engine: TestEngine,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(&BeeConfig::default(), false)
    }

    pub fn with_config(config: &BeeConfig, echo: bool) -> Self {
        let events = RadioEventQueue::new(config.event_queue_depth);
        let irq = events.handle();
        let radio = LoopbackRadio::new(events.handle()).with_echo(echo);
        let uart = MockUart::new();
        let engine = Engine::new(config, uart.clone(), radio, NoopWatchdog, events);
        Harness { uart, irq, engine }
    }

    /// Sends one frame from the host and runs the engine until it is idle.
    pub fn send(&mut self, payload: &[u8]) {
        self.uart.queue_rx_data(&encode(payload).unwrap());
        self.engine.run_until_idle().unwrap();
    }

    /// Frames the engine wrote since the last call, decoded.
    pub fn replies(&self) -> Vec<ApiFrame> {
        split_frames(&self.uart.take_tx_data())
    }
}

/// Splits a stream of wire frames and decodes each one.
pub fn split_frames(mut wire: &[u8]) -> Vec<ApiFrame> {
    let mut frames = Vec::new();
    while !wire.is_empty() {
        let len = u16::from_be_bytes([wire[1], wire[2]]) as usize;
        // walk past payload and checksum, honouring escapes
        let mut logical = 0;
        let mut i = 3;
        while logical < len + 1 {
            if wire[i] == 0x7D {
                i += 1;
            }
            i += 1;
            logical += 1;
        }
        frames.push(decode_wire(&wire[..i], len.max(1)).unwrap());
        wire = &wire[i..];
    }
    frames
}
