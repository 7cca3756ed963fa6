//! Classification of webhook callbacks into driver events.

use super::payload::InboundPayload;
use serde_json::{Map, Value};

/// A webhook callback classified by its `event` tag. Every variant carries the full body untouched;
/// consumers pick the fields they need.
#[derive(Debug, Clone, PartialEq)]
pub enum ViberEvent {
    MessageDelivered(Map<String, Value>),
    MessageFailed(Map<String, Value>),
    MessageSeen(Map<String, Value>),
    MessageStarted(Map<String, Value>),
    UserSubscribed(Map<String, Value>),
    UserUnsubscribed(Map<String, Value>),
    Webhook(Map<String, Value>),
    /// The tag is not an event (e.g. `message`) or is unknown.
    None,
}

impl ViberEvent {
    pub fn classify(payload: &InboundPayload) -> Self {
        let data = payload.body().clone();
        match payload.event() {
            Some("delivered") => Self::MessageDelivered(data),
            Some("failed") => Self::MessageFailed(data),
            Some("subscribed") => Self::UserSubscribed(data),
            Some("conversation_started") => Self::MessageStarted(data),
            Some("unsubscribed") => Self::UserUnsubscribed(data),
            Some("seen") => Self::MessageSeen(data),
            Some("webhook") => Self::Webhook(data),
            _ => Self::None,
        }
    }

    /// Host-facing event name, e.g. `message_delivered`. None has no name.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::MessageDelivered(_) => Some("message_delivered"),
            Self::MessageFailed(_) => Some("message_failed"),
            Self::MessageSeen(_) => Some("message_seen"),
            Self::MessageStarted(_) => Some("conversation_started"),
            Self::UserSubscribed(_) => Some("subscribed"),
            Self::UserUnsubscribed(_) => Some("unsubscribed"),
            Self::Webhook(_) => Some("webhook"),
            Self::None => None,
        }
    }

    pub fn payload(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::MessageDelivered(m)
            | Self::MessageFailed(m)
            | Self::MessageSeen(m)
            | Self::MessageStarted(m)
            | Self::UserSubscribed(m)
            | Self::UserUnsubscribed(m)
            | Self::Webhook(m) => Some(m),
            Self::None => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;

    fn classify(body: &str) -> ViberEvent {
        ViberEvent::classify(&InboundPayload::parse(body.as_bytes(), &HeaderMap::new()))
    }

    #[test]
    fn seen_wraps_full_body() {
        let ev = classify(r#"{"event":"seen","message_token":"123"}"#);
        let ViberEvent::MessageSeen(data) = &ev else {
            panic!("expected MessageSeen, got {:?}", ev);
        };
        assert_eq!(
            Value::Object(data.clone()),
            serde_json::json!({"event": "seen", "message_token": "123"})
        );
        assert_eq!(ev.name(), Some("message_seen"));
    }

    #[test]
    fn every_tag_maps_to_its_variant() {
        let cases = [
            ("delivered", "message_delivered"),
            ("failed", "message_failed"),
            ("subscribed", "subscribed"),
            ("conversation_started", "conversation_started"),
            ("unsubscribed", "unsubscribed"),
            ("seen", "message_seen"),
            ("webhook", "webhook"),
        ];
        for (tag, name) in cases {
            let body = format!(
                r#"{{"event":"{}","message_token":7,"user_id":"u1","nested":{{"a":[1,2]}}}}"#,
                tag
            );
            let ev = classify(&body);
            assert_eq!(ev.name(), Some(name), "tag {}", tag);
            let expected: Value = serde_json::from_str(&body).unwrap();
            assert_eq!(Value::Object(ev.payload().unwrap().clone()), expected);
        }
    }

    #[test]
    fn message_and_unknown_tags_are_none() {
        assert!(classify(r#"{"event":"message","message_token":1}"#).is_none());
        assert!(classify(r#"{"event":"Seen","message_token":1}"#).is_none());
        assert!(classify(r#"{"event":5,"message_token":1}"#).is_none());
        assert!(classify("garbage").is_none());
        assert_eq!(classify("{}").payload(), None);
    }
}
