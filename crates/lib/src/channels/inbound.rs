//! Inbound item from a channel: delivered by the gateway to whatever consumes callbacks.

use super::viber::{ChatMessage, ViberEvent};

/// A verified webhook call, already classified. Exactly one of event or message per request.
#[derive(Debug, Clone)]
pub enum Inbound {
    Event(ViberEvent),
    Message(ChatMessage),
}
