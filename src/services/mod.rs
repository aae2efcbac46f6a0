//! Typed wrappers over the backend resource endpoints.
//!
//! Each submodule mirrors one backend resource. Calls go through
//! [`ApiClient`](crate::api::ApiClient) and return pass-through JSON; only the
//! auth service interprets payloads.

pub mod auth;
pub mod books;
pub mod files;
pub mod notes;
pub mod profiles;
pub mod settings;
pub mod tasks;

use serde_json::Value;

use crate::api::ApiResponse;
use crate::error::{ApiError, ServiceError};

/// Percent-encode one path or query component.
///
/// Keeps the same unreserved set as a browser's `encodeURIComponent`.
pub fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Decode a successful response as JSON.
pub(crate) fn json_of(result: Result<ApiResponse, ApiError>) -> Result<Value, ServiceError> {
    Ok(result?.json_value()?)
}

/// Turn selected status failures into messages specific to one call.
///
/// The backend `message` wins when present; otherwise `fallbacks` supplies the
/// text for the matching status. Other failures pass through unchanged.
pub(crate) fn surface(err: ApiError, fallbacks: &[(u16, &str)]) -> ServiceError {
    if let ApiError::Status { code, message, .. } = &err {
        if let Some((_, fallback)) = fallbacks.iter().find(|(status, _)| status == code) {
            return ServiceError::Rejected {
                code: *code,
                message: message.clone().unwrap_or_else(|| fallback.to_string()),
            };
        }
    }
    ServiceError::Api(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(encode_component("978-0-13-110362-7"), "978-0-13-110362-7");
        assert_eq!(encode_component("a b/c?d"), "a%20b%2Fc%3Fd");
        assert_eq!(encode_component("élan"), "%C3%A9lan");
        assert_eq!(encode_component("it's(ok)*~!"), "it's(ok)*~!");
    }

    #[test]
    fn surface_prefers_backend_message() {
        let err = ApiError::status(409, r#"{"message":"Duplicate ISBN"}"#.to_string());
        let surfaced = surface(err, &[(409, "Book already exists in your library")]);
        assert_eq!(surfaced.to_string(), "Duplicate ISBN");
        assert_eq!(surfaced.status_code(), Some(409));

        let bare = surface(ApiError::status(409, String::new()), &[(409, "fallback")]);
        assert_eq!(bare.to_string(), "fallback");

        let other = surface(ApiError::status(418, String::new()), &[(409, "fallback")]);
        assert!(matches!(other, ServiceError::Api(_)));
    }
}
