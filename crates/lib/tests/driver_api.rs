//! Integration tests: the driver's outbound calls against a local fake Viber API.

mod common;

use reqwest::header::HeaderMap;
use serde_json::{json, Map, Value};
use viber_driver::channels::viber::{
    signature, DriverError, LocationTemplate, OutgoingMessage, ViberConfig, ViberDriver,
    SIGNATURE_HEADER,
};

async fn setup() -> (common::FakeViber, ViberConfig) {
    let (fake, base) = common::start_fake_viber().await;
    let config = ViberConfig::new("test-token").unwrap().with_api_base(base);
    (fake, config)
}

fn signed_request(config: &ViberConfig, body: &str) -> ViberDriver {
    let mut headers = HeaderMap::new();
    headers.insert(
        SIGNATURE_HEADER,
        signature::sign(body.as_bytes(), config.token()).parse().unwrap(),
    );
    ViberDriver::for_request(
        config.clone(),
        reqwest::Client::new(),
        body.as_bytes(),
        &headers,
    )
}

#[tokio::test]
async fn bot_id_is_fetched_once_per_instance() {
    let (fake, config) = setup().await;
    let driver = ViberDriver::new(config.clone(), reqwest::Client::new());

    assert_eq!(driver.bot_id().await.unwrap(), "pa:75346594275468546724");
    assert_eq!(driver.bot_id().await.unwrap(), "pa:75346594275468546724");
    let bot = driver.bot_identity().await.unwrap();
    assert_eq!(bot.name.as_deref(), Some("account name"));
    assert_eq!(bot.raw["uri"], "accountUri");

    let calls = fake.calls_to("get_account_info");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body, json!({}));

    // A fresh instance fetches again.
    let other = ViberDriver::new(config, reqwest::Client::new());
    other.bot_id().await.unwrap();
    assert_eq!(fake.calls_to("get_account_info").len(), 2);
}

#[tokio::test]
async fn standard_headers_are_sent() {
    let (fake, config) = setup().await;
    let driver = ViberDriver::new(config, reqwest::Client::new());
    driver.bot_id().await.unwrap();

    let call = &fake.calls()[0];
    assert_eq!(call.headers["x-viber-auth-token"], "test-token");
    assert_eq!(call.headers["accept"], "application/json");
    assert_eq!(call.headers["content-type"], "application/json");
}

#[tokio::test]
async fn account_info_without_id_is_an_error() {
    let (fake, config) = setup().await;
    fake.set_account_info(json!({"status": 0, "name": "no id"}));
    let driver = ViberDriver::new(config, reqwest::Client::new());
    assert!(matches!(driver.bot_id().await, Err(DriverError::Identity(_))));
}

#[tokio::test]
async fn message_without_sender_fails_before_account_lookup() {
    let (fake, config) = setup().await;
    let body = r#"{"event":"message","message_token":3,"message":{"text":"orphan"}}"#;
    let driver = signed_request(&config, body);
    assert!(matches!(
        driver.messages().await,
        Err(DriverError::MissingField("sender.id"))
    ));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn account_info_error_status_is_an_error() {
    let (fake, config) = setup().await;
    fake.set_account_info(json!({"status": 2, "status_message": "invalidAuthToken"}));
    let driver = ViberDriver::new(config, reqwest::Client::new());
    match driver.bot_id().await {
        Err(DriverError::Api(msg)) => assert!(msg.contains("invalidAuthToken"), "{}", msg),
        other => panic!("expected api error, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_api_is_a_request_error() {
    let port = common::free_port();
    let config = ViberConfig::new("t")
        .unwrap()
        .with_api_base(format!("http://127.0.0.1:{}/pa/", port));
    let driver = ViberDriver::new(config, reqwest::Client::new());
    assert!(matches!(driver.bot_id().await, Err(DriverError::Request(_))));
}

#[tokio::test]
async fn messages_attach_bot_id() {
    let (fake, config) = setup().await;
    let body = r#"{"event":"message","timestamp":1457764197627,"message_token":4912661846655238145,"sender":{"id":"01234567890A=","name":"John McClane"},"message":{"type":"text","text":"a message to the service"}}"#;
    let driver = signed_request(&config, body);
    assert!(driver.matches_request());
    assert!(driver.verify_request());
    assert!(driver.has_matching_event().is_none());

    let messages = driver.messages().await.unwrap();
    assert_eq!(messages.len(), 1);
    let msg = &messages[0];
    assert_eq!(msg.text, "a message to the service");
    assert_eq!(msg.sender, "01234567890A=");
    assert_eq!(msg.recipient, "pa:75346594275468546724");
    assert_eq!(msg.payload["timestamp"], 1457764197627u64);

    let answer = driver.conversation_answer(msg);
    assert_eq!(answer.text, "a message to the service");
    assert_eq!(fake.calls_to("get_account_info").len(), 1);
}

#[tokio::test]
async fn reply_sends_text_payload() {
    let (fake, config) = setup().await;
    let body = r#"{"event":"message","message_token":1,"sender":{"id":"u-1"},"message":{"text":"hi"}}"#;
    let driver = signed_request(&config, body);
    let msg = driver.messages().await.unwrap().remove(0);

    let mut extra = Map::new();
    extra.insert("sender".to_string(), json!({"name": "Bot"}));
    let res = driver
        .reply(&OutgoingMessage::text("hello back"), &msg, &extra)
        .await
        .unwrap();
    assert!(res.status().is_success());
    let reply: Value = res.json().await.unwrap();
    assert_eq!(reply["status"], 0);

    let sent = fake.calls_to("send_message");
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].body,
        json!({"receiver": "u-1", "sender": {"name": "Bot"}, "text": "hello back", "type": "text"})
    );
}

#[tokio::test]
async fn send_payload_with_template() {
    let (fake, config) = setup().await;
    let driver = ViberDriver::new(config, reqwest::Client::new());
    let payload = viber_driver::channels::viber::build_outbound_payload(
        &OutgoingMessage::Location(LocationTemplate::new(37.7898, -122.3942)),
        "u-2",
        &Map::new(),
    );
    driver.send_payload(&payload).await.unwrap();
    let sent = fake.calls_to("send_message");
    assert_eq!(
        sent[0].body,
        json!({"receiver": "u-2", "type": "location", "location": {"lat": 37.7898, "lon": -122.3942}})
    );
}

#[tokio::test]
async fn get_user_reads_user_details() {
    let (fake, config) = setup().await;
    let body = r#"{"event":"message","message_token":1,"sender":{"id":"u-3"},"message":{"text":"who am i"}}"#;
    let driver = signed_request(&config, body);
    let msg = driver.messages().await.unwrap().remove(0);

    let user = driver.get_user(&msg).await.unwrap();
    assert_eq!(user.id, "u-3");
    assert_eq!(user.first_name.as_deref(), Some("John McClane"));
    assert_eq!(user.username.as_deref(), Some("John McClane"));
    assert_eq!(fake.calls_to("get_user_details")[0].body, json!({"id": "u-3"}));
}

#[tokio::test]
async fn send_request_hits_arbitrary_endpoint() {
    let (fake, config) = setup().await;
    let driver = ViberDriver::new(config, reqwest::Client::new());
    let mut params = Map::new();
    params.insert("ids".to_string(), json!(["a", "b"]));
    let res = driver.send_request("get_online", &params).await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["echo"], json!({"ids": ["a", "b"]}));
    assert_eq!(fake.calls_to("get_online").len(), 1);
}

#[tokio::test]
async fn webhook_registration_round_trip() {
    let (fake, config) = setup().await;
    let driver = ViberDriver::new(config, reqwest::Client::new());
    driver
        .set_webhook("https://bot.example.com/viber/webhook", &["seen".to_string()])
        .await
        .unwrap();
    driver.remove_webhook().await.unwrap();

    let calls = fake.calls_to("set_webhook");
    assert_eq!(
        calls[0].body,
        json!({"url": "https://bot.example.com/viber/webhook", "event_types": ["seen"]})
    );
    assert_eq!(calls[1].body, json!({"url": ""}));
}
