//! Authenticated client for the BookVault backend.
//!
//! The client facade here intentionally remains small:
//! - bearer injection is delegated to `auth`.
//! - one-shot HTTP exchange is delegated to `transport`.
//! - 401 recovery is delegated to `refresh`.
//! - retry policy logic is delegated to `retry`.

mod auth;
mod refresh;
mod retry;
mod transport;

pub use refresh::{AuthEvents, AuthState, LOGIN_ROUTE, PUBLIC_ROUTES};
pub use retry::RetryPolicy;
pub use transport::HttpTransport;

use refresh::{Recovery, SessionRefresher};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::types::{ApiResponse, Method, RequestDescriptor};
use super::Transport;
use crate::config::Config;
use crate::error::ApiError;
use crate::session::{Session, SessionStore};

/// Client for the BookVault REST API.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    store: Arc<dyn SessionStore>,
    base_url: String,
    timeout: Duration,
    health_timeout: Duration,
    retry_policy: RetryPolicy,
    refresher: SessionRefresher,
    diagnostics: bool,
}

impl ApiClient {
    /// Build a client over real HTTP from resolved configuration.
    pub fn new(config: &Config, store: Arc<dyn SessionStore>) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()), store)
    }

    /// Build a client over an arbitrary transport.
    pub fn with_transport(
        config: &Config,
        transport: Arc<dyn Transport>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let base_url = config.api.normalized_base_url();
        let timeout = config.api.timeout();
        let refresher = SessionRefresher::new(
            Arc::clone(&transport),
            Arc::clone(&store),
            base_url.clone(),
            timeout,
        );
        Self {
            transport,
            store,
            base_url,
            timeout,
            health_timeout: config.api.health_timeout(),
            retry_policy: RetryPolicy::from_config(&config.api),
            refresher,
            diagnostics: config.app.diagnostics,
        }
    }

    /// Install the hook notified when the session cannot be recovered.
    pub fn with_events(mut self, events: Arc<dyn AuthEvents>) -> Self {
        self.refresher.set_events(events);
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session_store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn auth_state(&self) -> AuthState {
        self.refresher.state()
    }

    pub(crate) fn health_timeout(&self) -> Duration {
        self.health_timeout
    }

    /// Send a request with retries and session recovery.
    pub async fn send(&self, descriptor: RequestDescriptor) -> Result<ApiResponse, ApiError> {
        self.send_with_policy(descriptor, self.retry_policy).await
    }

    /// Send a request with session recovery but without retries.
    pub async fn send_once(&self, descriptor: RequestDescriptor) -> Result<ApiResponse, ApiError> {
        self.send_with_policy(descriptor, RetryPolicy::disabled())
            .await
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.send(RequestDescriptor::get(path)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<ApiResponse, ApiError> {
        self.send(RequestDescriptor::post(path, body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<ApiResponse, ApiError> {
        self.send(RequestDescriptor::new(Method::Put, path).with_body(body))
            .await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<ApiResponse, ApiError> {
        self.send(RequestDescriptor::new(Method::Patch, path).with_body(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.send(RequestDescriptor::new(Method::Delete, path))
            .await
    }

    /// Exchange the stored refresh token now and return the updated session.
    pub async fn refresh_session(&self) -> Result<Session, ApiError> {
        self.refresher.recover(None).await?;
        self.store
            .get()
            .ok_or_else(|| ApiError::Unauthorized("session disappeared after refresh".to_string()))
    }

    async fn send_with_policy(
        &self,
        mut descriptor: RequestDescriptor,
        policy: RetryPolicy,
    ) -> Result<ApiResponse, ApiError> {
        loop {
            match self.dispatch_authorized(&mut descriptor).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    if !policy.should_retry(&err, descriptor.retry_count) {
                        return Err(err);
                    }
                    descriptor.retry_count = descriptor.retry_count.saturating_add(1);
                    let delay = policy.delay_for(descriptor.retry_count);
                    if self.diagnostics {
                        tracing::debug!(
                            method = %descriptor.method,
                            path = %descriptor.path,
                            "retrying request ({}/{}) in {}ms: {err}",
                            descriptor.retry_count,
                            policy.max_retries,
                            delay.as_millis()
                        );
                    }
                    sleep(delay).await;
                }
            }
        }
    }

    /// Dispatch once, recovering the session on the first 401.
    async fn dispatch_authorized(
        &self,
        descriptor: &mut RequestDescriptor,
    ) -> Result<ApiResponse, ApiError> {
        let explicit_auth = descriptor.header("Authorization").is_some();
        let (sent_token, result) = self.dispatch(descriptor).await;
        let err = match result {
            Ok(response) => {
                if sent_token.is_some() {
                    self.refresher.mark_authorized();
                }
                return Ok(response);
            }
            Err(err) if err.status_code() == Some(401) => err,
            Err(err) => return Err(err),
        };

        // Anonymous calls (e.g. a failed login) and calls carrying their own
        // credentials surface the backend's 401 unchanged.
        let Some(stale) = sent_token.filter(|_| !explicit_auth) else {
            return Err(err);
        };
        if descriptor.auth_retried {
            return Err(self.refresher.fail("401 after session refresh"));
        }
        descriptor.auth_retried = true;

        let recovery = self.refresher.recover(Some(stale.as_str())).await?;
        if self.diagnostics {
            let how = match recovery {
                Recovery::Refreshed => "refreshed",
                Recovery::Reused => "reused",
            };
            tracing::debug!(path = %descriptor.path, "replaying request with {how} session");
        }

        let (_, replay) = self.dispatch(descriptor).await;
        match replay {
            Ok(response) => {
                self.refresher.mark_authorized();
                Ok(response)
            }
            Err(err) if err.status_code() == Some(401) => {
                Err(self.refresher.fail("401 after session refresh"))
            }
            Err(err) => Err(err),
        }
    }

    /// Request dispatcher: attach credentials and perform one exchange.
    ///
    /// Returns the access token the request carried alongside the result.
    pub(crate) async fn dispatch(
        &self,
        descriptor: &RequestDescriptor,
    ) -> (Option<String>, Result<ApiResponse, ApiError>) {
        let attached = auth::attach(descriptor.clone(), self.store.as_ref());
        let sent_token = attached.bearer_token().map(str::to_string);
        let request = attached.prepare(&self.base_url, self.timeout);
        if self.diagnostics {
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                authenticated = sent_token.is_some(),
                attempt = descriptor.retry_count + 1,
                "dispatching request"
            );
        }

        let result = match self.transport.execute(request).await {
            Ok(response) if response.is_success() => Ok(response),
            Ok(response) => {
                if self.diagnostics {
                    tracing::debug!(
                        status = response.status,
                        body = %response.text(),
                        "{}",
                        status_label(response.status)
                    );
                }
                Err(ApiError::status(response.status, response.text()))
            }
            Err(err) => {
                if self.diagnostics {
                    tracing::debug!("network error: {err}");
                }
                Err(err)
            }
        };
        (sent_token, result)
    }
}

fn status_label(code: u16) -> &'static str {
    match code {
        401 => "unauthorized",
        403 => "access forbidden",
        404 => "resource not found",
        422 => "validation error",
        429 => "rate limit exceeded",
        503 => "service unavailable",
        500..=599 => "server error",
        _ => "api error",
    }
}
