//! Radio IRQ Event Queue
//!
//! Hands radio events from interrupt context to the foreground loop. The radio
//! layer only ever holds a [`RadioIrqHandle`]; its callbacks enqueue the event and
//! return immediately. The foreground side drains the [`RadioEventQueue`] between
//! frames, so interrupt context never touches an engine buffer.

use crate::radio::driver::{RadioEvent, RadioEventHandler, ReceivedDataFrame};
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{channel, Receiver, Sender};

/// Statistics for radio event processing
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IrqStats {
    /// Total events raised by the radio
    pub total_events: u64,

    /// Events by type
    pub data_frames: u64,
    pub ack_frames: u64,
    pub crc_errors: u64,

    /// Events lost because the queue was full
    pub events_dropped: u64,
}

#[derive(Debug, Default)]
struct IrqCounters {
    total_events: AtomicU64,
    data_frames: AtomicU64,
    ack_frames: AtomicU64,
    crc_errors: AtomicU64,
    events_dropped: AtomicU64,
}

impl IrqCounters {
    fn snapshot(&self) -> IrqStats {
        IrqStats {
            total_events: self.total_events.load(Ordering::Relaxed),
            data_frames: self.data_frames.load(Ordering::Relaxed),
            ack_frames: self.ack_frames.load(Ordering::Relaxed),
            crc_errors: self.crc_errors.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Foreground end of the radio event exchange.
pub struct RadioEventQueue {
    tx: Sender<RadioEvent>,
    rx: Receiver<RadioEvent>,
    capacity: usize,
    counters: Arc<IrqCounters>,
}

impl RadioEventQueue {
    /// Create a new queue holding at most `capacity` pending events
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = channel(capacity);

        Self {
            tx,
            rx,
            capacity,
            counters: Arc::new(IrqCounters::default()),
        }
    }

    /// A producer handle for the radio layer.
    pub fn handle(&self) -> RadioIrqHandle {
        RadioIrqHandle {
            tx: self.tx.clone(),
            counters: Arc::clone(&self.counters),
        }
    }

    /// Next pending event, without blocking.
    pub fn try_next(&mut self) -> Option<RadioEvent> {
        self.rx.try_recv().ok()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> IrqStats {
        self.counters.snapshot()
    }
}

/// Interrupt-side producer of radio events.
///
/// Cloneable and `Send`; never blocks. When the queue is full the event is
/// dropped and counted.
#[derive(Clone)]
pub struct RadioIrqHandle {
    tx: Sender<RadioEvent>,
    counters: Arc<IrqCounters>,
}

impl RadioIrqHandle {
    /// Queue a radio event; returns false if it had to be dropped.
    pub fn queue_event(&self, event: RadioEvent) -> bool {
        self.counters.total_events.fetch_add(1, Ordering::Relaxed);
        match &event {
            RadioEvent::DataReceived(_) => self.counters.data_frames.fetch_add(1, Ordering::Relaxed),
            RadioEvent::AckReceived { .. } => {
                self.counters.ack_frames.fetch_add(1, Ordering::Relaxed)
            }
            RadioEvent::CrcError => self.counters.crc_errors.fetch_add(1, Ordering::Relaxed),
            _ => 0,
        };

        match self.tx.try_send(event) {
            Ok(()) => {
                debug!("Radio event queued");
                true
            }
            Err(TrySendError::Full(_)) => {
                self.counters.events_dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Radio event queue full, event dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.counters.events_dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Radio event queue closed, event dropped");
                false
            }
        }
    }

    pub fn stats(&self) -> IrqStats {
        self.counters.snapshot()
    }
}

impl RadioEventHandler for RadioIrqHandle {
    fn on_data_frame(&mut self, frame: ReceivedDataFrame) {
        self.queue_event(RadioEvent::DataReceived(frame));
    }

    fn on_ack_frame(&mut self, sequence_number: u8) {
        self.queue_event(RadioEvent::AckReceived { sequence_number });
    }

    fn on_beacon_frame(&mut self, payload: &[u8]) {
        self.queue_event(RadioEvent::BeaconReceived {
            payload: payload.to_vec(),
        });
    }

    fn on_mac_command_frame(&mut self, payload: &[u8]) {
        self.queue_event(RadioEvent::MacCommandReceived {
            payload: payload.to_vec(),
        });
    }

    fn on_crc_error(&mut self) {
        self.queue_event(RadioEvent::CrcError);
    }
}
