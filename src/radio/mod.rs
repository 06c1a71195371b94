//! The radio module models the IEEE 802.15.4 side of the engine: MAC frame
//! templates, the radio layer interface, the interrupt-to-foreground event
//! queue and a loopback radio for hosts without hardware.

pub mod driver;
pub mod irq;
pub mod loopback;
pub mod mac;

pub use driver::{RadioConfig, RadioError, RadioEvent, RadioEventHandler, RadioLayer, ReceivedDataFrame};
pub use irq::{IrqStats, RadioEventQueue, RadioIrqHandle};
pub use loopback::{LoopbackRadio, SentFrame};
pub use mac::{AddressMode, FrameControl, FrameType, MacAddress, MacFrameTemplate};
