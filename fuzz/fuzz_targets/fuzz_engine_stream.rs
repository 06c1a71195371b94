#![no_main]

use bee_rs::api::serial_mock::MockUart;
use bee_rs::config::BeeConfig;
use bee_rs::engine::{Engine, NoopWatchdog};
use bee_rs::radio::{LoopbackRadio, RadioEventQueue};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // A hostile serial stream may be dropped but must not wedge the engine
    let config = BeeConfig::default();
    let events = RadioEventQueue::new(config.event_queue_depth);
    let radio = LoopbackRadio::new(events.handle()).with_echo(true);
    let uart = MockUart::new();
    let mut engine = Engine::new(&config, uart.clone(), radio, NoopWatchdog, events);

    uart.queue_rx_data(data);
    let _ = engine.run_until_idle();
    assert!(uart.pending_rx() < 3 || engine.state() != bee_rs::EngineState::Normal);
});
