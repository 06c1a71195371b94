//! # Protocol Engine
//!
//! The foreground loop tying the serial link to the radio. Each [`Engine::poll`]
//! services the watchdog, forwards queued radio events to the host, then
//! processes at most one inbound API frame:
//!
//! ```text
//! poll_header -> validate -> decode -> dispatch -> encode -> write
//! ```
//!
//! Frame-level failures are logged and the frame is dropped; the host never sees
//! an error frame. Only UART failures outside a frame body leave `poll` as `Err`.
//!
//! ## Usage
//! ```rust
//! use bee_rs::api::serial_mock::MockUart;
//! use bee_rs::config::BeeConfig;
//! use bee_rs::engine::{Engine, NoopWatchdog};
//! use bee_rs::radio::{LoopbackRadio, RadioEventQueue};
//!
//! let config = BeeConfig::default();
//! let events = RadioEventQueue::new(config.event_queue_depth);
//! let radio = LoopbackRadio::new(events.handle());
//! let uart = MockUart::new();
//! let mut engine = Engine::new(&config, uart.clone(), radio, NoopWatchdog, events);
//!
//! uart.queue_rx_data(&[0x7E, 0x00, 0x04, 0x08, 0x01, b'C', b'H', 0x6B]);
//! engine.run_until_idle().unwrap();
//! assert_eq!(&uart.get_tx_data()[3..9], &[0x88, 0x01, b'C', b'H', 0x00, 0x19]);
//! ```

pub mod dispatcher;
pub mod receive;
pub mod transmit;

use crate::api::at::{AtParameterTable, DEFAULT_AT_TABLE};
use crate::api::frame::{decode, encode_into, skip_body, ApiFrame, FrameHeader};
use crate::api::serial::UartTransport;
use crate::config::BeeConfig;
use crate::constants::MIN_BUFFER_CAPACITY;
use crate::error::{BeeError, FrameError};
use crate::radio::driver::{RadioConfig, RadioError, RadioLayer};
use crate::radio::irq::RadioEventQueue;
use crate::radio::mac::MacFrameTemplate;
use crate::util::logging::{log_frame_hex, span_frame_processing, LogThrottle};
use bytes::BytesMut;
use log::{debug, info, warn};

pub use dispatcher::{dispatch, DispatchContext, DispatchOutcome};
pub use receive::ReceiveAdapter;
pub use transmit::{TemplateOverride, TransmitPath};

/// Hardware watchdog as seen by the engine.
pub trait Watchdog {
    /// Called once per poll while the engine runs.
    fn service(&mut self);

    /// Lets the watchdog expire so the node resets.
    fn trigger_reset(&mut self);
}

/// Watchdog for hosts without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWatchdog;

impl Watchdog for NoopWatchdog {
    fn service(&mut self) {}

    fn trigger_reset(&mut self) {
        info!("Reset requested; no watchdog attached");
    }
}

/// Engine life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Normal,
    /// Waiting for the hardware reset; terminal
    Reset,
}

/// Result of one [`Engine::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// No complete frame header was available
    Idle,
    Dispatched(DispatchOutcome),
    /// Bad framing, checksum or length; nothing was answered
    Discarded(FrameError),
    /// Recognised command too short for its layout
    Malformed,
    /// The radio refused the frame
    RadioFailed(RadioError),
    /// The engine is in [`EngineState::Reset`]
    Halted,
}

/// Running totals of an engine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    pub frames_received: u64,
    pub frames_discarded: u64,
    pub responses_sent: u64,
    pub transmits: u64,
    pub events_forwarded: u64,
}

/// Window and cap for discard warnings
const DISCARD_LOG_WINDOW_MS: u64 = 1000;
const DISCARD_LOG_CAP: u32 = 5;

pub struct Engine<U, R, W = NoopWatchdog> {
    state: EngineState,
    radio_config: RadioConfig,
    uart: U,
    transmit: TransmitPath<R>,
    watchdog: W,
    events: RadioEventQueue,
    receiver: ReceiveAdapter,
    at_table: AtParameterTable,
    inbound: ApiFrame,
    response: ApiFrame,
    wire: BytesMut,
    discard_throttle: LogThrottle,
    stats: EngineStats,
}

impl<U, R, W> Engine<U, R, W>
where
    U: UartTransport,
    R: RadioLayer,
    W: Watchdog,
{
    /// Builds an engine in [`EngineState::Normal`].
    ///
    /// `events` must be the queue whose handle the radio reports through.
    /// Buffer capacities outside `16..=65535` are clamped into that range.
    pub fn new(config: &BeeConfig, uart: U, radio: R, watchdog: W, events: RadioEventQueue) -> Self {
        let template = MacFrameTemplate::from_config(&config.radio, config.pan_id_compression);
        let capacity = config
            .buffer_capacity
            .clamp(MIN_BUFFER_CAPACITY, u16::MAX as usize);
        if capacity != config.buffer_capacity {
            warn!(
                "Buffer capacity {} clamped to {}",
                config.buffer_capacity, capacity
            );
        }
        info!(
            "Engine up: channel {}, PAN 0x{:04X}, address 0x{:04X}, buffers {} bytes",
            config.radio.channel, config.radio.pan_id, config.radio.short_address, capacity
        );

        Engine {
            state: EngineState::Normal,
            radio_config: config.radio,
            uart,
            transmit: TransmitPath::new(template, radio),
            watchdog,
            events,
            receiver: ReceiveAdapter::new(capacity),
            at_table: AtParameterTable::clone(&DEFAULT_AT_TABLE),
            inbound: ApiFrame::with_capacity(capacity),
            response: ApiFrame::with_capacity(capacity),
            wire: BytesMut::with_capacity(capacity * 2),
            discard_throttle: LogThrottle::new(DISCARD_LOG_WINDOW_MS, DISCARD_LOG_CAP),
            stats: EngineStats::default(),
        }
    }

    /// Replaces the AT parameter table. Only possible before the engine runs.
    pub fn with_at_table(mut self, table: AtParameterTable) -> Self {
        self.at_table = table;
        self
    }

    /// One iteration of the foreground loop.
    pub fn poll(&mut self) -> Result<PollOutcome, BeeError> {
        if self.state == EngineState::Reset {
            return Ok(PollOutcome::Halted);
        }

        self.watchdog.service();
        self.forward_radio_events()?;

        let Some(bytes) = self.uart.poll_header()? else {
            return Ok(PollOutcome::Idle);
        };
        let header = FrameHeader::from_bytes(bytes);
        if let Err(e) = header.validate() {
            return Ok(self.discard(e));
        }
        if let Err(e) = decode(header, &mut self.uart, &mut self.inbound) {
            if matches!(e, FrameError::CapacityExceeded { .. }) {
                if let Err(skip) = skip_body(header, &mut self.uart) {
                    debug!("Refused frame body cut short: {}", skip);
                }
            }
            return Ok(self.discard(e));
        }
        self.stats.frames_received += 1;
        log_frame_hex("RX", self.inbound.payload());

        let outcome = self.dispatch_inbound()?;
        if self.state == EngineState::Reset {
            return Ok(outcome);
        }
        self.forward_radio_events()?;
        Ok(outcome)
    }

    /// Polls until no complete frame is waiting; returns the frames dispatched.
    pub fn run_until_idle(&mut self) -> Result<usize, BeeError> {
        let mut dispatched = 0;
        loop {
            match self.poll()? {
                PollOutcome::Idle | PollOutcome::Halted => return Ok(dispatched),
                PollOutcome::Dispatched(_) => dispatched += 1,
                _ => {}
            }
        }
    }

    fn dispatch_inbound(&mut self) -> Result<PollOutcome, BeeError> {
        let _span = span_frame_processing("api");
        let mut ctx = DispatchContext {
            radio_config: &mut self.radio_config,
            transmit: &mut self.transmit,
            at_table: &self.at_table,
            response: &mut self.response,
        };

        let outcome = match dispatch(&self.inbound, &mut ctx) {
            Ok(outcome) => outcome,
            Err(BeeError::MalformedCommand(what)) => {
                warn!("Malformed command dropped: {}", what);
                return Ok(PollOutcome::Malformed);
            }
            Err(BeeError::Radio(e)) => {
                warn!("Transmit failed: {}", e);
                return Ok(PollOutcome::RadioFailed(e));
            }
            Err(BeeError::Frame(e)) => return Ok(self.discard(e)),
            Err(e) => return Err(e),
        };

        match outcome {
            DispatchOutcome::Respond => self.send_response()?,
            DispatchOutcome::RespondThenReset => {
                self.send_response()?;
                warn!("Software reset requested, halting");
                self.watchdog.trigger_reset();
                self.state = EngineState::Reset;
            }
            DispatchOutcome::Transmitted => self.stats.transmits += 1,
            DispatchOutcome::Consumed | DispatchOutcome::Ignored(_) => {}
        }
        Ok(PollOutcome::Dispatched(outcome))
    }

    fn send_response(&mut self) -> Result<(), BeeError> {
        self.wire.clear();
        encode_into(self.response.payload(), &mut self.wire)?;
        log_frame_hex("TX", &self.wire);
        self.uart.write_all(&self.wire)?;
        self.stats.responses_sent += 1;
        Ok(())
    }

    /// Drains the radio event queue through the receive adapter and writes
    /// whatever it produced.
    fn forward_radio_events(&mut self) -> Result<(), BeeError> {
        let mut forwarded = 0u64;
        for _ in 0..self.events.capacity() {
            let Some(event) = self.events.try_next() else {
                break;
            };
            event.deliver(&mut self.receiver);
            forwarded += 1;
        }
        if forwarded > 0 {
            debug!("Forwarded {} radio events", forwarded);
            self.stats.events_forwarded += forwarded;
        }

        if self.receiver.has_pending() {
            log_frame_hex("TX", self.receiver.pending());
            self.uart.write_all(self.receiver.pending())?;
            self.receiver.clear_pending();
        }
        Ok(())
    }

    fn discard(&mut self, error: FrameError) -> PollOutcome {
        self.stats.frames_discarded += 1;
        if self.discard_throttle.allow() {
            let suppressed = self.discard_throttle.take_suppressed();
            if suppressed > 0 {
                warn!("{} frame discards suppressed", suppressed);
            }
            warn!("Frame discarded: {}", error);
        } else {
            debug!("Frame discarded: {}", error);
        }
        PollOutcome::Discarded(error)
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn radio_config(&self) -> &RadioConfig {
        &self.radio_config
    }

    pub fn template(&self) -> &MacFrameTemplate {
        self.transmit.template()
    }

    pub fn radio(&self) -> &R {
        self.transmit.radio()
    }

    pub fn radio_mut(&mut self) -> &mut R {
        self.transmit.radio_mut()
    }

    pub fn uart(&self) -> &U {
        &self.uart
    }

    pub fn watchdog(&self) -> &W {
        &self.watchdog
    }

    pub fn event_queue(&self) -> &RadioEventQueue {
        &self.events
    }
}
