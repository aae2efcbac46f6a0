//! Session refresh flow.
//!
//! On a 401 the client exchanges the stored refresh token for a new access
//! token and replays the request once. The exchange is single-flight: the
//! `gate` mutex serializes recoveries, and a waiter that finds the stored
//! access token already differs from the one its request carried reuses that
//! session instead of refreshing again.

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;

use crate::api::types::{ApiResponse, Method, RequestDescriptor};
use crate::api::Transport;
use crate::error::ApiError;
use crate::session::SessionStore;

/// Path of the token refresh endpoint.
pub(super) const REFRESH_PATH: &str = "/v1/token/refresh";
/// Route the UI should show when the session cannot be recovered.
pub const LOGIN_ROUTE: &str = "/login";
/// Routes reachable without a session; no redirect is issued from these.
pub const PUBLIC_ROUTES: [&str; 2] = ["/login", "/register"];

const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

/// Observable authorization state of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Authorized,
    Refreshing,
    Unauthorized,
}

/// Hook through which the client tells the UI layer the session is gone.
///
/// The UI owns routing: the client only reports where the user should go.
pub trait AuthEvents: Send + Sync {
    /// Route currently shown, used to suppress redirect loops on public pages.
    fn current_route(&self) -> Option<String> {
        None
    }

    fn on_unauthenticated(&self, login_route: &str);
}

/// Result of a successful recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Recovery {
    /// This caller performed the token exchange.
    Refreshed,
    /// Another caller refreshed while this one waited.
    Reused,
}

pub(super) struct SessionRefresher {
    transport: Arc<dyn Transport>,
    store: Arc<dyn SessionStore>,
    base_url: String,
    timeout: Duration,
    events: Option<Arc<dyn AuthEvents>>,
    gate: AsyncMutex<()>,
    state: Mutex<AuthState>,
}

impl SessionRefresher {
    pub(super) fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn SessionStore>,
        base_url: String,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            store,
            base_url,
            timeout,
            events: None,
            gate: AsyncMutex::new(()),
            state: Mutex::new(AuthState::Authorized),
        }
    }

    pub(super) fn set_events(&mut self, events: Arc<dyn AuthEvents>) {
        self.events = Some(events);
    }

    pub(super) fn state(&self) -> AuthState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn swap_state(&self, next: AuthState) -> AuthState {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        std::mem::replace(&mut *state, next)
    }

    /// Record that an authenticated request went through.
    pub(super) fn mark_authorized(&self) {
        if self.state() == AuthState::Unauthorized {
            self.swap_state(AuthState::Authorized);
        }
    }

    /// Recover the session after a 401 on a request sent with `stale_token`.
    ///
    /// With `None` the exchange always runs (explicit refresh).
    pub(super) async fn recover(&self, stale_token: Option<&str>) -> Result<Recovery, ApiError> {
        let _guard = self.gate.lock().await;

        let Some(session) = self.store.get() else {
            return Err(self.fail("no stored session"));
        };
        if let Some(stale) = stale_token {
            if session
                .access_token()
                .is_some_and(|current| current != stale)
            {
                tracing::debug!("reusing session refreshed by a concurrent request");
                return Ok(Recovery::Reused);
            }
        }
        let Some(refresh_token) = session.refresh_token().map(str::to_string) else {
            return Err(self.fail("no refresh token stored"));
        };

        self.swap_state(AuthState::Refreshing);
        let payload = match self.exchange(&refresh_token).await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!("token refresh failed: {err}");
                return Err(self.fail("token refresh rejected"));
            }
        };

        let updated = session.merged_with(&payload);
        if updated.access_token().is_none() {
            return Err(self.fail("refresh response carried no access token"));
        }
        if let Err(err) = self.store.set(&updated) {
            tracing::warn!("failed to persist refreshed session: {err}");
            return Err(self.fail("refreshed session could not be stored"));
        }
        self.swap_state(AuthState::Authorized);
        tracing::debug!("session refreshed");
        Ok(Recovery::Refreshed)
    }

    /// Drop the session and notify the UI. Used for every irrecoverable 401.
    pub(super) fn fail(&self, reason: &str) -> ApiError {
        tracing::debug!(reason, "session is no longer valid");
        if let Err(err) = self.store.clear() {
            tracing::warn!("failed to clear session: {err}");
        }
        let previous = self.swap_state(AuthState::Unauthorized);
        if previous != AuthState::Unauthorized {
            self.notify_unauthenticated();
        }
        ApiError::Unauthorized(SESSION_EXPIRED.to_string())
    }

    fn notify_unauthenticated(&self) {
        let Some(events) = self.events.as_ref() else {
            return;
        };
        let on_public_route = events
            .current_route()
            .is_some_and(|route| PUBLIC_ROUTES.contains(&route.as_str()));
        if !on_public_route {
            events.on_unauthenticated(LOGIN_ROUTE);
        }
    }

    /// Exchange the refresh token for a new token payload.
    async fn exchange(&self, refresh_token: &str) -> Result<Value, ApiError> {
        let request = RequestDescriptor::new(Method::Post, REFRESH_PATH)
            .with_body(json!({}))
            .with_header("Authorization", format!("Bearer {refresh_token}"))
            .prepare(&self.base_url, self.timeout);
        let response: ApiResponse = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(ApiError::status(response.status, response.text()));
        }
        response.json_value()
    }
}
