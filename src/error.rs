//! Unified error types for the client.

use std::error::Error as StdError;
use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Why a request produced no HTTP response at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// The server actively refused the TCP connection.
    ConnectionRefused,
    /// The host name did not resolve.
    NotFound,
    Timeout,
    /// No route to the network (interface down or unreachable).
    Offline,
    Other,
}

impl NetworkErrorKind {
    /// Message shown to users when a request fails with this kind.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::ConnectionRefused => {
                "Unable to connect to server - please ensure the backend is running"
            }
            Self::NotFound => "Server not found - please check the API endpoint configuration",
            Self::Timeout => "Request timeout - please try again",
            Self::Offline => "No internet connection - please check your network",
            Self::Other => "Network error - please check your connection",
        }
    }
}

/// Errors from the HTTP API layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No response was received.
    Network {
        kind: NetworkErrorKind,
        message: String,
    },
    /// Non-2xx status from the backend.
    Status {
        code: u16,
        body: String,
        /// Backend-provided `message` field, when the body carried one.
        message: Option<String>,
    },
    /// The session could not be (re)established; the user must log in again.
    Unauthorized(String),
    /// A 2xx body could not be decoded into the expected shape.
    InvalidResponse(String),
}

impl ApiError {
    /// Build a status error, extracting the backend `message` from JSON bodies.
    pub fn status(code: u16, body: String) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .filter(|m| !m.trim().is_empty());
        Self::Status {
            code,
            body,
            message,
        }
    }

    pub fn network(kind: NetworkErrorKind) -> Self {
        Self::Network {
            kind,
            message: kind.user_message().to_string(),
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn network_kind(&self) -> Option<NetworkErrorKind> {
        match self {
            Self::Network { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Human-readable message suitable for a toast or banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { message, .. } => message.clone(),
            Self::Status { code, .. } if *code >= 500 => {
                "Server error - please try again later".to_string()
            }
            Self::Status {
                code,
                body,
                message,
            } => match message {
                Some(message) => message.clone(),
                None if !body.trim().is_empty() => body.trim().to_string(),
                None => format!("Request failed with status {code}"),
            },
            Self::Unauthorized(msg) => msg.clone(),
            Self::InvalidResponse(_) => "Unexpected response from server".to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { message, .. } => write!(f, "network: {message}"),
            Self::Status { code, body, .. } => write!(f, "status {code}: {body}"),
            Self::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return Self::InvalidResponse(e.to_string());
        }
        let kind = classify_reqwest_error(&e);
        Self::Network {
            kind,
            message: kind.user_message().to_string(),
        }
    }
}

/// Map a transport failure onto the network taxonomy by walking its source chain.
pub(crate) fn classify_reqwest_error(err: &reqwest::Error) -> NetworkErrorKind {
    if err.is_timeout() {
        return NetworkErrorKind::Timeout;
    }
    let mut source: Option<&(dyn StdError + 'static)> = err.source();
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            match io.kind() {
                std::io::ErrorKind::ConnectionRefused => {
                    return NetworkErrorKind::ConnectionRefused
                }
                std::io::ErrorKind::TimedOut => return NetworkErrorKind::Timeout,
                std::io::ErrorKind::NetworkUnreachable
                | std::io::ErrorKind::NetworkDown
                | std::io::ErrorKind::HostUnreachable => return NetworkErrorKind::Offline,
                _ => {}
            }
        }
        let text = inner.to_string();
        if text.contains("dns error") || text.contains("failed to lookup address") {
            return NetworkErrorKind::NotFound;
        }
        source = inner.source();
    }
    NetworkErrorKind::Other
}

// ---------------------------------------------------------------------------
// ServiceError
// ---------------------------------------------------------------------------

/// Errors surfaced by the typed service calls, already normalized for display.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before any request was made.
    Invalid(String),
    /// The pre-flight connectivity probe failed.
    Unavailable(String),
    /// The request never reached the backend.
    Unreachable(ApiError),
    /// Backend rejection with a service-specific message.
    Rejected { code: u16, message: String },
    Api(ApiError),
    Session(crate::session::SessionError),
}

impl ServiceError {
    /// Underlying API error, when there is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Unreachable(err) | Self::Api(err) => Some(err),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Rejected { code, .. } => Some(*code),
            _ => self.api_error().and_then(ApiError::status_code),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(msg) => write!(f, "{msg}"),
            Self::Unavailable(msg) => write!(f, "Server unavailable: {msg}"),
            Self::Unreachable(_) => write!(
                f,
                "Unable to connect to server. Please check your internet connection and try again."
            ),
            Self::Rejected { message, .. } => write!(f, "{message}"),
            Self::Api(err) => write!(f, "{}", err.user_message()),
            Self::Session(err) => write!(f, "session storage: {err}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Unreachable(err) | Self::Api(err) => Some(err),
            Self::Session(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for ServiceError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

impl From<crate::session::SessionError> for ServiceError {
    fn from(e: crate::session::SessionError) -> Self {
        Self::Session(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let e = ConfigError::from(io_err);
        let s = e.to_string();
        assert!(s.starts_with("io:"), "got: {s}");
        assert!(s.contains("file not found"));
    }

    #[test]
    fn config_error_from_toml() {
        let toml_err: toml::de::Error = toml::from_str::<toml::Value>("x = [unclosed").unwrap_err();
        let e = ConfigError::from(toml_err);
        assert!(e.to_string().starts_with("toml:"));
    }

    #[test]
    fn status_error_extracts_backend_message() {
        let err = ApiError::status(409, r#"{"message":"Email already exists"}"#.to_string());
        assert_eq!(err.status_code(), Some(409));
        assert_eq!(err.user_message(), "Email already exists");
    }

    #[test]
    fn status_error_without_message_falls_back_to_body() {
        let err = ApiError::status(422, "bad isbn".to_string());
        assert_eq!(err.user_message(), "bad isbn");
        let empty = ApiError::status(404, String::new());
        assert_eq!(empty.user_message(), "Request failed with status 404");
    }

    #[test]
    fn server_errors_use_generic_retry_later_message() {
        let err = ApiError::status(503, r#"{"message":"db down"}"#.to_string());
        assert_eq!(err.user_message(), "Server error - please try again later");
        assert_eq!(err.to_string(), r#"status 503: {"message":"db down"}"#);
    }

    #[test]
    fn network_errors_carry_kind_specific_message() {
        let err = ApiError::network(NetworkErrorKind::ConnectionRefused);
        assert!(err.is_network());
        assert_eq!(err.status_code(), None);
        assert!(err.user_message().contains("ensure the backend is running"));
        assert_eq!(
            ApiError::network(NetworkErrorKind::Timeout).user_message(),
            "Request timeout - please try again"
        );
    }

    #[test]
    fn unauthorized_is_distinguished() {
        let err = ApiError::Unauthorized("session expired".into());
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "unauthorized: session expired");
    }

    #[test]
    fn service_error_messages_are_display_ready() {
        let unavailable = ServiceError::Unavailable("Server is not running or unreachable".into());
        assert_eq!(
            unavailable.to_string(),
            "Server unavailable: Server is not running or unreachable"
        );
        let unreachable =
            ServiceError::Unreachable(ApiError::network(NetworkErrorKind::ConnectionRefused));
        assert!(unreachable.to_string().starts_with("Unable to connect to server."));
        assert!(unreachable.source().is_some());
        let api = ServiceError::from(ApiError::status(404, String::new()));
        assert_eq!(api.status_code(), Some(404));
        assert_eq!(api.to_string(), "Request failed with status 404");
    }
}
