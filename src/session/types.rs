//! Session record model.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Persisted login state: the token pair plus whatever user claims the
/// backend returned alongside them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unrelated claims (`email`, `id`, `role`, ...) carried through untouched.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
            claims: Map::new(),
        }
    }

    /// Build a session from a login payload. Returns `None` when the payload
    /// carries no access token.
    pub fn from_login_payload(payload: &Value) -> Option<Self> {
        let session: Self = serde_json::from_value(payload.clone()).ok()?;
        session.access_token()?;
        Some(session)
    }

    /// Access token, ignoring empty values.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    /// Refresh token, ignoring empty values.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    /// Overlay the fields of a token-refresh payload onto this session.
    ///
    /// Keys present in `update` win; every other claim is kept.
    pub fn merged_with(&self, update: &Value) -> Self {
        let mut merged = self.clone();
        let Some(fields) = update.as_object() else {
            return merged;
        };
        for (key, value) in fields {
            match key.as_str() {
                "access_token" => merged.access_token = value.as_str().map(str::to_string),
                "refresh_token" => merged.refresh_token = value.as_str().map(str::to_string),
                _ => {
                    merged.claims.insert(key.clone(), value.clone());
                }
            }
        }
        merged
    }

    pub fn claim_str(&self, key: &str) -> Option<&str> {
        self.claims.get(key).and_then(Value::as_str)
    }

    /// `exp` claim of a JWT access token, when the token is a decodable JWT.
    pub fn access_token_expiry(&self) -> Option<i64> {
        let token = self.access_token()?;
        let mut parts = token.split('.');
        let (_header, payload, _sig) = (parts.next()?, parts.next()?, parts.next()?);
        let raw = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        let claims: Value = serde_json::from_slice(&raw).ok()?;
        claims.get("exp").and_then(Value::as_i64)
    }
}
