//! Building the JSON body of a `send_message` call.

use super::template::OutgoingMessage;
use serde_json::{Map, Value};

/// Build the `send_message` body for `message` addressed to `recipient`.
///
/// `extra` is deep-merged over `{receiver}`; a rich template's fields go underneath, so keys the
/// caller set always win over the template's. Plain text sets `text` and `type: "text"`.
pub fn build_outbound_payload(
    message: &OutgoingMessage,
    recipient: &str,
    extra: &Map<String, Value>,
) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("receiver".to_string(), Value::from(recipient));
    deep_merge(&mut params, extra);
    params.insert("receiver".to_string(), Value::from(recipient));

    match message {
        OutgoingMessage::Text(text) => {
            params.insert("text".to_string(), Value::from(text.as_str()));
            params.insert("type".to_string(), Value::from("text"));
            params
        }
        rich => {
            let mut merged = rich.template_fields().unwrap_or_default();
            for (k, v) in params {
                merged.insert(k, v);
            }
            merged
        }
    }
}

/// Merge `src` into `dst`: objects merge key by key, arrays concatenate, anything else from `src` replaces.
pub fn deep_merge(dst: &mut Map<String, Value>, src: &Map<String, Value>) {
    for (key, incoming) in src {
        let combined = match (dst.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(inner)) => {
                deep_merge(existing, inner);
                true
            }
            (Some(Value::Array(existing)), Value::Array(items)) => {
                existing.extend(items.iter().cloned());
                true
            }
            _ => false,
        };
        if !combined {
            dst.insert(key.clone(), incoming.clone());
        }
    }
}
