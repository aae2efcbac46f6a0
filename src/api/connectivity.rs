//! Backend health probe.

use serde::Serialize;

use super::client::ApiClient;
use super::types::RequestDescriptor;
use crate::error::{ApiError, NetworkErrorKind};

/// Path probed by [`ApiClient::check_connection`].
pub const HEALTH_PATH: &str = "/health";

const CONNECTED: &str = "Connected to server";

/// Outcome of one connectivity probe. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub is_connected: bool,
    /// `status` field reported by the health endpoint, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub message: String,
    /// Raw failure text for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionStatus {
    fn connected(status: Option<String>) -> Self {
        Self {
            is_connected: true,
            status,
            message: CONNECTED.to_string(),
            error: None,
        }
    }

    fn failed(err: &ApiError) -> Self {
        Self {
            is_connected: false,
            status: None,
            message: classify(err).to_string(),
            error: Some(err.to_string()),
        }
    }
}

fn classify(err: &ApiError) -> &'static str {
    match err.network_kind() {
        Some(NetworkErrorKind::ConnectionRefused) => return "Server is not running or unreachable",
        Some(NetworkErrorKind::NotFound) => {
            return "Server not found - check API endpoint configuration"
        }
        Some(NetworkErrorKind::Timeout) => return "Connection timeout - server may be overloaded",
        _ => {}
    }
    if err.status_code().is_some_and(|code| code >= 500) {
        return "Server error - please try again later";
    }
    if err.network_kind() == Some(NetworkErrorKind::Offline) {
        return "No internet connection";
    }
    "Unable to connect to server"
}

impl ApiClient {
    /// Probe `GET /health` once.
    ///
    /// Runs without retries or session recovery, so it never mutates the
    /// stored session.
    pub async fn check_connection(&self) -> ConnectionStatus {
        let descriptor = RequestDescriptor::get(HEALTH_PATH).with_timeout(self.health_timeout());
        let (_, result) = self.dispatch(&descriptor).await;
        let status = match result {
            Ok(response) => ConnectionStatus::connected(
                response
                    .json_value()
                    .ok()
                    .and_then(|body| body.get("status")?.as_str().map(str::to_string)),
            ),
            Err(err) => ConnectionStatus::failed(&err),
        };
        tracing::debug!(
            connected = status.is_connected,
            message = %status.message,
            "connectivity probe finished"
        );
        status
    }
}
