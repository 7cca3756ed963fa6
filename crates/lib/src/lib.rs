//! Viber driver library: webhook ingestion and verification, event classification, outbound
//! message translation, plus the gateway and config used by the CLI.

pub mod channels;
pub mod config;
pub mod gateway;
