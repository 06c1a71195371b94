//! # Configuration
//!
//! Start-up settings of the engine. Every field has a compiled-in default, so an
//! empty JSON object is a valid configuration file:
//!
//! ```json
//! {
//!   "radio": { "channel": 15, "pan_id": 13106 },
//!   "buffer_capacity": 100,
//!   "serial": { "port": "/dev/ttyACM0", "baudrate": 57600 }
//! }
//! ```
//!
//! Settings are read once; nothing is written back.

use crate::api::serial::SerialConfig;
use crate::constants::*;
use crate::error::BeeError;
use crate::radio::driver::RadioConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Power saving mode of the node. Only always-on is supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepMode {
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeeConfig {
    pub radio: RadioConfig,
    /// Omit the source PAN ID from outgoing MAC headers
    pub pan_id_compression: bool,
    /// Payload capacity of each API frame buffer
    pub buffer_capacity: usize,
    pub serial: SerialConfig,
    pub sleep_mode: SleepMode,
    /// Radio events buffered between polls
    pub event_queue_depth: usize,
}

impl Default for BeeConfig {
    fn default() -> Self {
        BeeConfig {
            radio: RadioConfig::default(),
            pan_id_compression: true,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            serial: SerialConfig::default(),
            sleep_mode: SleepMode::None,
            event_queue_depth: DEFAULT_EVENT_QUEUE_DEPTH,
        }
    }
}

impl BeeConfig {
    /// Reads and validates a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BeeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| BeeError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, BeeError> {
        let config: BeeConfig =
            serde_json::from_str(text).map_err(|e| BeeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, BeeError> {
        serde_json::to_string_pretty(self).map_err(|e| BeeError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), BeeError> {
        let channels = IEEE802154_MIN_CHANNEL..=IEEE802154_MAX_CHANNEL;
        if !channels.contains(&self.radio.channel) {
            return Err(BeeError::Config(format!(
                "channel {} outside {}..={}",
                self.radio.channel, IEEE802154_MIN_CHANNEL, IEEE802154_MAX_CHANNEL
            )));
        }
        if self.buffer_capacity < MIN_BUFFER_CAPACITY
            || self.buffer_capacity > u16::MAX as usize
        {
            return Err(BeeError::Config(format!(
                "buffer capacity {} outside {}..={}",
                self.buffer_capacity,
                MIN_BUFFER_CAPACITY,
                u16::MAX
            )));
        }
        if self.event_queue_depth == 0 {
            return Err(BeeError::Config("event queue depth must be non-zero".into()));
        }
        if self.serial.baudrate == 0 {
            return Err(BeeError::Config("baudrate must be non-zero".into()));
        }
        Ok(())
    }
}
