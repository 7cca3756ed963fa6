//! Inbound webhook payload: decoded JSON body, raw bytes, and the signature header.

use reqwest::header::HeaderMap;
use serde_json::{Map, Value};

/// `X-Viber-Content-Signature`: hex HMAC-SHA256 of the raw body.
pub const SIGNATURE_HEADER: &str = "x-viber-content-signature";

/// One webhook call as received. Lives for the duration of a single request.
#[derive(Debug, Clone, Default)]
pub struct InboundPayload {
    body: Map<String, Value>,
    raw: Vec<u8>,
    signature: String,
}

impl InboundPayload {
    /// Decode a webhook request. Anything that is not a JSON object decodes to an empty map; this never fails.
    pub fn parse(raw: &[u8], headers: &HeaderMap) -> Self {
        let body = match serde_json::from_slice::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => {
                log::debug!("viber webhook body is not JSON, treating as empty: {}", e);
                Map::new()
            }
        };
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        Self {
            body,
            raw: raw.to_vec(),
            signature,
        }
    }

    /// Decoded body (empty when the request body was not a JSON object).
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Exact request bytes, as signed by Viber.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// The `event` tag, when it is a string.
    pub fn event(&self) -> Option<&str> {
        self.body.get("event").and_then(Value::as_str)
    }

    /// True iff both `event` and `message_token` are present and non-empty.
    pub fn matches_request(&self) -> bool {
        self.body.get("event").is_some_and(is_truthy)
            && self.body.get("message_token").is_some_and(is_truthy)
    }
}

/// Loose truthiness: null, false, 0, "", "0" and empty collections are falsy.
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
