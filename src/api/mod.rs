//! The api module contains the serial side of the engine: the API frame codec,
//! the typed command model, the AT parameter engine and the UART transport.

pub mod at;
pub mod command;
pub mod frame;
pub mod serial;
pub mod serial_mock;

pub use at::{read_parameter, set_parameter, AtParameterTable, AtStatus, DEFAULT_AT_TABLE};
pub use command::{ApiIdentifier, AtCode, Command, ReceiveOptions, TransmitOptions};
pub use frame::{decode, decode_wire, encode, encode_into, ApiFrame, ByteSource, FrameHeader};
pub use serial::{SerialConfig, SerialUart, UartTransport};
pub use serial_mock::MockUart;
