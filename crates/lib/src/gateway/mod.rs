//! Gateway: HTTP front for channel webhooks.
//!
//! Single port serves a health probe and the Viber callback route. Verified callbacks are
//! forwarded to an in-process consumer over an mpsc channel.

mod server;

pub use server::{router, run_gateway, GatewayState};
