//! Fake Viber REST API for integration tests: records every call and answers with canned JSON.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub endpoint: String,
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct FakeViber {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    account_info: Arc<Mutex<Option<Value>>>,
}

impl FakeViber {
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.endpoint == endpoint)
            .collect()
    }

    /// Override the `get_account_info` response body.
    pub fn set_account_info(&self, body: Value) {
        *self.account_info.lock().unwrap() = Some(body);
    }
}

pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

/// Start the fake API on a free port. Returns the handle and the API base URL (with trailing slash).
pub async fn start_fake_viber() -> (FakeViber, String) {
    let fake = FakeViber::default();
    let app = Router::new()
        .route("/pa/:endpoint", post(handle))
        .with_state(fake.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake viber");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (fake, format!("http://{}/pa/", addr))
}

async fn handle(
    State(fake): State<FakeViber>,
    Path(endpoint): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    let parsed: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    fake.calls.lock().unwrap().push(RecordedCall {
        endpoint: endpoint.clone(),
        headers,
        body: parsed.clone(),
    });
    let reply = match endpoint.as_str() {
        "get_account_info" => fake.account_info.lock().unwrap().clone().unwrap_or_else(|| {
            json!({
                "status": 0,
                "status_message": "ok",
                "id": "pa:75346594275468546724",
                "name": "account name",
                "uri": "accountUri",
            })
        }),
        "get_user_details" => json!({
            "status": 0,
            "status_message": "ok",
            "message_token": 4912661846655238145u64,
            "user": {
                "id": parsed.get("id").cloned().unwrap_or(Value::Null),
                "name": "John McClane",
                "language": "en",
                "country": "UK",
            }
        }),
        "send_message" => json!({
            "status": 0,
            "status_message": "ok",
            "message_token": 5741311803571721087u64,
        }),
        "set_webhook" => json!({
            "status": 0,
            "status_message": "ok",
            "event_types": ["delivered", "seen", "failed", "subscribed", "unsubscribed", "conversation_started"],
        }),
        _ => json!({ "status": 0, "status_message": "ok", "echo": parsed }),
    };
    Json(reply)
}
