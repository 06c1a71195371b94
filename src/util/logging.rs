//! # Logging Utilities
//!
//! Rate limiting for noisy diagnostics, hex dumps of API frames and optional
//! `tracing` spans around frame processing.
//!
//! ```rust
//! use bee_rs::util::logging::{log_frame_hex, LogThrottle};
//!
//! let mut throttle = LogThrottle::new(1000, 5); // 5 messages per second
//! if throttle.allow() {
//!     log::warn!("Checksum mismatch");
//! }
//! log_frame_hex("RX", &[0x7E, 0x00, 0x04]);
//! ```

use crate::util::hex::format_hex_compact;
use std::time::Instant;

/// Limit of bytes shown by [`log_frame_hex`]
const MAX_LOG_BYTES: usize = 64;

/// Throttling structure for rate-limiting log messages
#[derive(Debug)]
pub struct LogThrottle {
    /// Time window for throttling (in milliseconds)
    window_ms: u64,
    /// Maximum messages allowed per window
    cap: u32,
    /// Current message count in window
    count: u32,
    /// Messages refused since the last allowed one
    suppressed: u32,
    /// Start time of current window
    t0: Instant,
}

impl LogThrottle {
    /// Create new throttle allowing `cap` messages per `window_ms`
    pub fn new(window_ms: u64, cap: u32) -> Self {
        Self {
            window_ms,
            cap,
            count: 0,
            suppressed: 0,
            t0: Instant::now(),
        }
    }

    /// Check if logging is allowed (resets counter after window expires)
    pub fn allow(&mut self) -> bool {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(self.t0).as_millis() as u64;

        if elapsed_ms > self.window_ms {
            self.t0 = now;
            self.count = 0;
        }

        self.count = self.count.saturating_add(1);
        if self.count <= self.cap {
            true
        } else {
            self.suppressed = self.suppressed.saturating_add(1);
            false
        }
    }

    /// Number of refused messages since the last call; resets the tally.
    pub fn take_suppressed(&mut self) -> u32 {
        std::mem::take(&mut self.suppressed)
    }

    /// Reset the throttle (start new window immediately)
    pub fn reset(&mut self) {
        self.t0 = Instant::now();
        self.count = 0;
        self.suppressed = 0;
    }
}

/// Log frame data in hex at debug level, truncated to 64 bytes
pub fn log_frame_hex(prefix: &str, data: &[u8]) {
    if !log::log_enabled!(target: "bee::frame", log::Level::Debug) {
        return;
    }

    let shown = &data[..data.len().min(MAX_LOG_BYTES)];
    let suffix = if data.len() > MAX_LOG_BYTES {
        format!(" ... ({} bytes total)", data.len())
    } else {
        String::new()
    };

    log::debug!(target: "bee::frame", "{prefix}: {}{suffix}", format_hex_compact(shown));
}

/// Create a tracing span for frame processing
#[cfg(feature = "tracing")]
pub fn span_frame_processing(frame_type: &str) -> tracing::span::EnteredSpan {
    tracing::debug_span!("frame_processing", frame_type = frame_type).entered()
}

/// Fallback span creation when tracing is not available
#[cfg(not(feature = "tracing"))]
pub fn span_frame_processing(_frame_type: &str) {}
