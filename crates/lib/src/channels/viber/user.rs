//! Viber user profile as returned by `get_user_details`.

use super::error::DriverError;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Normalized user record. Viber only reports a display name, so it fills both `first_name` and `username`.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    /// The full `user` object (avatar, country, language, device info, ...).
    pub info: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct UserDetailsResponse {
    #[serde(default)]
    user: Option<Map<String, Value>>,
}

/// The fields of `user` the record is built from; the rest stays in `info`.
#[derive(Debug, Deserialize)]
struct UserProfile {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl User {
    /// Build from a `get_user_details` response body.
    pub fn from_details(body: &Value) -> Result<Self, DriverError> {
        let response = UserDetailsResponse::deserialize(body)?;
        let info = response.user.ok_or(DriverError::MissingField("user"))?;
        let profile = UserProfile::deserialize(&Value::Object(info.clone()))?;
        let id = profile.id.ok_or(DriverError::MissingField("user.id"))?;
        Ok(Self {
            id,
            first_name: profile.name.clone(),
            last_name: None,
            username: profile.name,
            info,
        })
    }
}
