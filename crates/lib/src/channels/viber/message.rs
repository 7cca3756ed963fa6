//! Incoming chat messages and conversation answers.

use super::error::DriverError;
use super::payload::InboundPayload;
use serde_json::{Map, Value};

/// A user message normalized for the host: who sent it, to which bot, and what it said.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub text: String,
    /// Viber user id of the sender; replies go back to this id.
    pub sender: String,
    /// Bot account id the message was addressed to.
    pub recipient: String,
    pub payload: Map<String, Value>,
}

/// Build a [`ChatMessage`] from a `message` callback.
///
/// The sender is `sender.id`, falling back to `user.id` (used by `conversation_started`-style bodies).
/// A body with neither, or without `message.text`, is rejected with [`DriverError::MissingField`].
pub fn extract_message(payload: &InboundPayload, bot_id: &str) -> Result<ChatMessage, DriverError> {
    let (sender, text) = sender_and_text(payload)?;
    Ok(ChatMessage {
        text: text.to_string(),
        sender: sender.to_string(),
        recipient: bot_id.to_string(),
        payload: payload.body().clone(),
    })
}

/// Sender id and text of a `message` callback, checked before anything else is resolved.
pub(super) fn sender_and_text(payload: &InboundPayload) -> Result<(&str, &str), DriverError> {
    let sender = id_of(payload, "sender")
        .or_else(|| id_of(payload, "user"))
        .ok_or(DriverError::MissingField("sender.id"))?;
    let text = payload
        .get("message")
        .and_then(|m| m.get("text"))
        .and_then(Value::as_str)
        .ok_or(DriverError::MissingField("message.text"))?;
    Ok((sender, text))
}

fn id_of<'a>(payload: &'a InboundPayload, object: &str) -> Option<&'a str> {
    payload.get(object)?.get("id")?.as_str()
}

/// A reply to a pending question: the answer text and the message it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub message: ChatMessage,
}

impl Answer {
    pub fn from_message(message: &ChatMessage) -> Self {
        Self {
            text: message.text.clone(),
            message: message.clone(),
        }
    }
}
