//! Decoding of the claims segment of an identity token.
//!
//! The signature is not verified here: the backend verifies every bearer token it receives,
//! and the client only reads display fields and the reviewer flag.

use crate::error::DecodeError;
use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde::Deserialize;
use serde_json::Value;

pub const REVIEWER_CLAIM: &str = "custom:is_reviewer";
pub const ANONYMOUS_NAME: &str = "User";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "cognito:username")]
    pub username: Option<String>,
    #[serde(default, rename = "custom:is_reviewer", deserialize_with = "flag")]
    pub is_reviewer: bool,
    /// Expiry, seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// `name`, else `email`, else "User".
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.email.as_deref().filter(|e| !e.is_empty()))
            .unwrap_or(ANONYMOUS_NAME)
            .to_string()
    }

    /// Identity the backend records for this user: `email`, else `cognito:username`.
    pub fn user_id(&self) -> Option<&str> {
        self.email
            .as_deref()
            .filter(|e| !e.is_empty())
            .or(self.username.as_deref())
    }

    pub fn is_expired_at(&self, unix_now: i64) -> bool {
        matches!(self.exp, Some(exp) if exp <= unix_now)
    }
}

/// Decode the payload (second) segment of a JWT.
pub fn decode_claims(token: &str) -> Result<Claims, DecodeError> {
    let mut parts = token.trim().split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(DecodeError::Malformed),
    };

    let payload = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .map_err(|e| DecodeError::Base64(e.to_string()))?;

    let value: Value =
        serde_json::from_slice(&bytes).map_err(|e| DecodeError::Json(e.to_string()))?;
    if !value.is_object() {
        return Err(DecodeError::Json("payload is not an object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| DecodeError::Json(e.to_string()))
}

/// The reviewer flag is issued as the string "true"/"false"; a JSON bool is accepted too.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(Value::Bool(b)) => b,
        _ => false,
    })
}
