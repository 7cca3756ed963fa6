//! Errors surfaced by the Viber driver.

/// Failure of a driver operation. Signature mismatches are not errors (see [`super::signature::verify`]).
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// A field the operation cannot do without is absent from the payload (e.g. `sender.id`).
    #[error("viber payload missing field: {0}")]
    MissingField(&'static str),
    #[error("viber auth token not configured")]
    NotConfigured,
    #[error("viber request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("viber response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    /// `get_account_info` answered without a usable bot account id.
    #[error("viber bot identity unavailable: {0}")]
    Identity(String),
    /// Viber answered with a non-zero `status` (or a non-success HTTP status).
    #[error("viber api error: {0}")]
    Api(String),
}
