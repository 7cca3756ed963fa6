//! Gateway HTTP server: health probe plus the Viber webhook route.

use crate::channels::viber::{DriverError, ViberConfig, ViberDriver};
use crate::channels::Inbound;
use crate::config::Config;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Shared state for the gateway. Each webhook call still gets its own driver instance.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub viber: ViberConfig,
    /// Pooled HTTP client handed to every driver instance.
    pub client: reqwest::Client,
    /// Sender for verified callbacks. The consumer task receives.
    pub inbound_tx: mpsc::Sender<Inbound>,
}

/// Router with `GET /` and the configured webhook route.
pub fn router(state: GatewayState) -> Router {
    let webhook_path = state.config.gateway.webhook_path.clone();
    Router::new()
        .route("/", get(health_http))
        .route(&webhook_path, post(viber_webhook))
        .with_state(state)
}

/// Run the gateway until ctrl-c. Verified callbacks are sent to `inbound_tx`.
///
/// `viber` is the resolved driver config (see [`crate::config::resolve_viber_config`]).
/// When `channels.viber.webhookUrl` is set, the URL is registered with Viber once the listener is
/// bound (Viber calls it back during registration) and removed again on shutdown.
pub async fn run_gateway(
    config: Config,
    viber: ViberConfig,
    inbound_tx: mpsc::Sender<Inbound>,
) -> Result<()> {
    let client = reqwest::Client::new();
    let bind_addr = format!("{}:{}", config.gateway.bind, config.gateway.port);
    let webhook_url = config.channels.viber.webhook_url.clone();
    let event_types = config.channels.viber.event_types.clone();

    let state = GatewayState {
        config: Arc::new(config),
        viber: viber.clone(),
        client: client.clone(),
        inbound_tx,
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    if let Some(ref url) = webhook_url {
        let driver = ViberDriver::new(viber.clone(), client.clone());
        let url = url.clone();
        tokio::spawn(async move {
            match driver.set_webhook(&url, &event_types).await {
                Ok(_) => log::info!("viber webhook registered: {}", url),
                Err(e) => log::warn!("viber set_webhook failed: {}", e),
            }
        });
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;

    if webhook_url.is_some() {
        let driver = ViberDriver::new(viber, client);
        if let Err(e) = driver.remove_webhook().await {
            log::debug!("viber remove_webhook on shutdown: {}", e);
        }
    }
    log::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("shutdown signal received");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "channel": "viber",
        "port": state.config.gateway.port,
    }))
}

/// POST webhook: ignore foreign requests, reject bad signatures, then forward the event or message.
async fn viber_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let driver =
        ViberDriver::for_request(state.viber.clone(), state.client.clone(), &body, &headers);
    if !driver.matches_request() {
        log::debug!("viber webhook: request does not look like a Viber callback, ignoring");
        return StatusCode::OK;
    }
    if !driver.verify_request() {
        log::warn!("viber webhook: signature mismatch, rejecting");
        return StatusCode::FORBIDDEN;
    }

    let items = match driver.has_matching_event() {
        Some(event) => {
            log::debug!("viber webhook: event {}", event.name().unwrap_or("?"));
            vec![Inbound::Event(event)]
        }
        None => match driver.messages().await {
            Ok(messages) => messages.into_iter().map(Inbound::Message).collect(),
            Err(DriverError::MissingField(field)) => {
                log::debug!("viber webhook: message without {}", field);
                return StatusCode::BAD_REQUEST;
            }
            Err(e) => {
                // Bot identity fetch failed (transport, api status, or no account id).
                log::warn!("viber webhook: could not resolve message: {}", e);
                return StatusCode::BAD_GATEWAY;
            }
        },
    };

    for item in items {
        if state.inbound_tx.send(item).await.is_err() {
            return StatusCode::SERVICE_UNAVAILABLE;
        }
    }
    StatusCode::OK
}
