//! The Viber driver: one instance per inbound request (or per outbound send).

use super::error::DriverError;
use super::event::ViberEvent;
use super::message::{extract_message, sender_and_text, Answer, ChatMessage};
use super::outbound::build_outbound_payload;
use super::payload::InboundPayload;
use super::signature;
use super::template::OutgoingMessage;
use super::user::User;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::OnceCell;

pub const DRIVER_NAME: &str = "Viber";

pub const VIBER_API_BASE: &str = "https://chatapi.viber.com/pa/";

const AUTH_TOKEN_HEADER: &str = "x-viber-auth-token";

/// Driver configuration. Construction fails without a token, so a built config is always usable.
#[derive(Debug, Clone)]
pub struct ViberConfig {
    token: String,
    api_base: String,
}

impl ViberConfig {
    pub fn new(token: impl Into<String>) -> Result<Self, DriverError> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(DriverError::NotConfigured);
        }
        Ok(Self {
            token,
            api_base: VIBER_API_BASE.to_string(),
        })
    }

    /// Point the driver at another REST base (tests, proxies). A trailing slash is added when missing.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        self.api_base = base;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}{}", self.api_base, name.trim_start_matches('/'))
    }
}

/// The bot account as reported by `get_account_info`.
#[derive(Debug, Clone, PartialEq)]
pub struct BotIdentity {
    pub id: String,
    pub name: Option<String>,
    pub raw: Value,
}

/// Status envelope every Viber REST response carries.
#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    status_message: Option<String>,
}

/// `get_account_info` response (fields the driver reads).
#[derive(Debug, Deserialize)]
struct AccountInfoResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl BotIdentity {
    fn from_account_info(raw: Value) -> Result<Self, DriverError> {
        let info = AccountInfoResponse::deserialize(&raw)
            .map_err(|e| DriverError::Identity(format!("malformed get_account_info: {}", e)))?;
        let id = info
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DriverError::Identity("get_account_info returned no id".to_string()))?;
        Ok(Self {
            id,
            name: info.name,
            raw,
        })
    }
}

pub struct ViberDriver {
    config: ViberConfig,
    client: reqwest::Client,
    payload: InboundPayload,
    bot: OnceCell<BotIdentity>,
}

impl ViberDriver {
    /// Driver with no inbound request attached, for sending only.
    pub fn new(config: ViberConfig, client: reqwest::Client) -> Self {
        Self::with_payload(config, client, InboundPayload::default())
    }

    /// Driver bound to one webhook call.
    pub fn for_request(
        config: ViberConfig,
        client: reqwest::Client,
        body: &[u8],
        headers: &HeaderMap,
    ) -> Self {
        Self::with_payload(config, client, InboundPayload::parse(body, headers))
    }

    fn with_payload(config: ViberConfig, client: reqwest::Client, payload: InboundPayload) -> Self {
        Self {
            config,
            client,
            payload,
            bot: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        DRIVER_NAME
    }

    pub fn config(&self) -> &ViberConfig {
        &self.config
    }

    pub fn payload(&self) -> &InboundPayload {
        &self.payload
    }

    /// Whether the bound request is a Viber callback at all.
    pub fn matches_request(&self) -> bool {
        self.payload.matches_request()
    }

    /// Check `X-Viber-Content-Signature` against the raw body. Callers must reject the request on `false`.
    pub fn verify_request(&self) -> bool {
        signature::verify(
            self.payload.raw(),
            self.payload.signature(),
            self.config.token(),
        )
    }

    /// The classified event, or `None` when the request carries a chat message (or an unknown tag).
    pub fn has_matching_event(&self) -> Option<ViberEvent> {
        match ViberEvent::classify(&self.payload) {
            ViberEvent::None => None,
            event => Some(event),
        }
    }

    /// The chat message of the bound request. Fetches the bot identity on first use.
    pub async fn messages(&self) -> Result<Vec<ChatMessage>, DriverError> {
        sender_and_text(&self.payload)?;
        let bot_id = self.bot_id().await?;
        Ok(vec![extract_message(&self.payload, &bot_id)?])
    }

    pub fn conversation_answer(&self, message: &ChatMessage) -> Answer {
        Answer::from_message(message)
    }

    /// `send_message` body replying to `matching`'s sender.
    pub fn build_service_payload(
        &self,
        message: &OutgoingMessage,
        matching: &ChatMessage,
        extra: &Map<String, Value>,
    ) -> Map<String, Value> {
        build_outbound_payload(message, &matching.sender, extra)
    }

    /// POST `send_message`. The response is returned as-is, whatever its status.
    pub async fn send_payload(
        &self,
        payload: &Map<String, Value>,
    ) -> Result<reqwest::Response, DriverError> {
        self.post("send_message", &Value::Object(payload.clone())).await
    }

    /// Build and send a reply to `matching`.
    pub async fn reply(
        &self,
        message: &OutgoingMessage,
        matching: &ChatMessage,
        extra: &Map<String, Value>,
    ) -> Result<reqwest::Response, DriverError> {
        let payload = self.build_service_payload(message, matching, extra);
        self.send_payload(&payload).await
    }

    /// Look up the sender of `matching` via `get_user_details`.
    pub async fn get_user(&self, matching: &ChatMessage) -> Result<User, DriverError> {
        self.get_user_by_id(&matching.sender).await
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<User, DriverError> {
        let res = self.post("get_user_details", &json!({ "id": id })).await?;
        let body = read_api_json(res).await?;
        User::from_details(&body)
    }

    /// POST any endpoint under the API base with the standard headers. Raw response, no status check.
    pub async fn send_request(
        &self,
        endpoint: &str,
        params: &Map<String, Value>,
    ) -> Result<reqwest::Response, DriverError> {
        self.post(endpoint, &Value::Object(params.clone())).await
    }

    /// Register the webhook URL. An empty `event_types` leaves Viber's default set.
    pub async fn set_webhook(&self, url: &str, event_types: &[String]) -> Result<Value, DriverError> {
        let mut params = Map::new();
        params.insert("url".to_string(), Value::from(url));
        if !event_types.is_empty() {
            params.insert("event_types".to_string(), json!(event_types));
        }
        let res = self.send_request("set_webhook", &params).await?;
        read_api_json(res).await
    }

    /// Remove the webhook (Viber: `set_webhook` with an empty url).
    pub async fn remove_webhook(&self) -> Result<Value, DriverError> {
        self.set_webhook("", &[]).await
    }

    /// Bot account identity, fetched once per driver instance. Nothing is cached on failure.
    pub async fn bot_identity(&self) -> Result<&BotIdentity, DriverError> {
        self.bot
            .get_or_try_init(|| async {
                log::debug!("viber: fetching account info");
                let res = self.post("get_account_info", &json!({})).await?;
                let raw = read_api_json(res).await?;
                BotIdentity::from_account_info(raw)
            })
            .await
    }

    pub async fn bot_id(&self) -> Result<String, DriverError> {
        Ok(self.bot_identity().await?.id.clone())
    }

    async fn post(&self, endpoint: &str, body: &Value) -> Result<reqwest::Response, DriverError> {
        let url = self.config.endpoint(endpoint);
        log::debug!("viber: POST {}", url);
        let res = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(AUTH_TOKEN_HEADER, self.config.token())
            .json(body)
            .send()
            .await?;
        Ok(res)
    }
}

/// Decode a Viber API response, turning HTTP failures and non-zero `status` into [`DriverError::Api`].
async fn read_api_json(res: reqwest::Response) -> Result<Value, DriverError> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        return Err(DriverError::Api(format!("{} {}", status, text)));
    }
    let envelope: ApiStatus = serde_json::from_str(&text)?;
    if envelope.status != 0 {
        let message = envelope
            .status_message
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(DriverError::Api(format!(
            "status {}: {}",
            envelope.status, message
        )));
    }
    Ok(serde_json::from_str(&text)?)
}
