//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.viber-driver/config.json`) and environment.

use crate::channels::viber::{ViberConfig, VIBER_API_BASE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Webhook gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Channel settings (Viber).
    #[serde(default)]
    pub channels: ChannelsConfig,
}

/// Gateway bind, port, and webhook route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 15152).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,

    /// Route Viber POSTs callbacks to (default "/viber/webhook").
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
}

fn default_gateway_port() -> u16 {
    15152
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_webhook_path() -> String {
    "/viber/webhook".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
            webhook_path: default_webhook_path(),
        }
    }
}

/// Per-channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    #[serde(default)]
    pub viber: ViberChannelConfig,
}

/// Viber channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViberChannelConfig {
    /// Auth token from the Viber admin panel. Overridden by VIBER_AUTH_TOKEN env when set.
    pub auth_token: Option<String>,
    /// REST base URL. Overridden by VIBER_API_BASE env; defaults to the public Viber API.
    pub api_base: Option<String>,
    /// Public URL Viber should POST callbacks to. When set, the gateway registers it on startup and removes it on shutdown.
    pub webhook_url: Option<String>,
    /// Callback types to subscribe to (e.g. "delivered", "seen"). Empty keeps Viber's default set.
    #[serde(default)]
    pub event_types: Vec<String>,
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

/// Resolve the Viber auth token: env VIBER_AUTH_TOKEN overrides config.
pub fn resolve_viber_token(config: &Config) -> Option<String> {
    non_empty_env("VIBER_AUTH_TOKEN").or_else(|| {
        config
            .channels
            .viber
            .auth_token
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Resolve the REST base URL: env VIBER_API_BASE, then config, then the public API.
pub fn resolve_viber_api_base(config: &Config) -> String {
    non_empty_env("VIBER_API_BASE")
        .or_else(|| {
            config
                .channels
                .viber
                .api_base
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_else(|| VIBER_API_BASE.to_string())
}

/// True when a token is available from env or config.
pub fn is_viber_configured(config: &Config) -> bool {
    resolve_viber_token(config).is_some()
}

/// Typed driver config, or None when no token is configured.
pub fn resolve_viber_config(config: &Config) -> Option<ViberConfig> {
    let token = resolve_viber_token(config)?;
    ViberConfig::new(token)
        .ok()
        .map(|c| c.with_api_base(resolve_viber_api_base(config)))
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("VIBER_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".viber-driver").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path (or the default). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
