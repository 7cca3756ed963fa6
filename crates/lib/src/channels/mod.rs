//! Communication channels (Viber).
//!
//! The driver lives in [`viber`]; inbound callbacks it accepts are handed to the gateway's
//! consumer as [`Inbound`] items.

mod inbound;
pub mod viber;

pub use inbound::Inbound;
pub use viber::{ChatMessage, ViberConfig, ViberDriver, ViberEvent};
