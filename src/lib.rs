//! # bee-rs - An XBee-Compatible API Frame Engine
//!
//! The bee-rs crate lets an IEEE 802.15.4 radio module speak the framed "API
//! mode" serial protocol of XBee 802.15.4 modules, so host software written for
//! that protocol can drive it over a UART.
//!
//! ## Features
//!
//! - API frame codec: start delimiter, big-endian length, byte stuffing and checksum
//! - Typed decoding of AT commands, 16/64-bit transmit requests and loopback frames
//! - Table-driven AT parameter engine (`CH`, `ID`, `DH`, `DL`, `MY`, `SH`, `SL`, `WR`, `RE`, `FR`)
//! - Transmit path with per-frame ack and broadcast-PAN overrides that always restore
//! - Receive packets and transmit status frames built from radio events
//! - Interrupt-safe event queue between the radio and the foreground loop
//! - JSON configuration, logging and a serial harness binary (`bee-cli`)
//!
//! ## Usage
//!
//! ```rust
//! use bee_rs::{decode_wire, encode, Command, AtCode};
//!
//! let wire = encode(&[0x08, 0x01, b'I', b'D']).unwrap();
//! let frame = decode_wire(&wire, 100).unwrap();
//! match Command::parse(frame.payload()).unwrap() {
//!     Command::AtRead(request) => assert_eq!(request.code, AtCode::PanId),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

pub mod api;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod logging;
pub mod radio;
pub mod util;

pub use crate::error::{BeeError, FrameError};
pub use crate::logging::{init_logger_with_level, log_info};

// Frame codec and command model
pub use api::command::{ApiIdentifier, AtCode, AtRequest, Command, TransmitRequest};
pub use api::frame::{decode, decode_wire, encode, ApiFrame, FrameHeader};
pub use api::serial::{SerialConfig, SerialUart, UartTransport};

// Engine
pub use config::BeeConfig;
pub use engine::{Engine, EngineState, NoopWatchdog, PollOutcome, Watchdog};

// Radio side
pub use radio::{LoopbackRadio, MacAddress, RadioConfig, RadioEventQueue, RadioLayer};
