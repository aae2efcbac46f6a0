//! Account and session lifecycle calls.

use serde_json::{json, Value};

use super::{json_of, surface};
use crate::api::{ApiClient, RequestDescriptor};
use crate::error::{ApiError, ServiceError};
use crate::session::{Session, SessionStore};

const ACCESS_LOGOUT_PATH: &str = "/v1/token/logout/access";
const REFRESH_LOGOUT_PATH: &str = "/v1/token/logout/refresh";

/// Fail early with the probe's message when the backend is unreachable.
async fn ensure_reachable(client: &ApiClient) -> Result<(), ServiceError> {
    let status = client.check_connection().await;
    if status.is_connected {
        Ok(())
    } else {
        Err(ServiceError::Unavailable(status.message))
    }
}

fn unreachable_or(err: ApiError, fallbacks: &[(u16, &str)]) -> ServiceError {
    if err.is_network() {
        ServiceError::Unreachable(err)
    } else {
        surface(err, fallbacks)
    }
}

pub async fn register(
    client: &ApiClient,
    email: &str,
    name: &str,
    password: &str,
) -> Result<Value, ServiceError> {
    ensure_reachable(client).await?;
    let body = json!({ "email": email, "name": name, "password": password });
    let response = client.post("/v1/register", body).await.map_err(|err| {
        unreachable_or(err, &[(422, "Validation error"), (409, "Email already exists")])
    })?;
    Ok(response.json_value()?)
}

/// Log in and persist the returned session.
///
/// The payload is stored only when it carries an access token; it is
/// returned either way.
pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<Value, ServiceError> {
    ensure_reachable(client).await?;
    let body = json!({ "email": email, "password": password });
    let response = client
        .post("/v1/login", body)
        .await
        .map_err(|err| unreachable_or(err, &[]))?;
    let payload = response.json_value()?;
    if let Some(session) = Session::from_login_payload(&payload) {
        client.session_store().set(&session)?;
        tracing::debug!("session stored after login");
    }
    Ok(payload)
}

/// Revoke both tokens where possible, then drop the session.
///
/// Revocation is best effort; the local session is cleared regardless.
pub async fn logout(client: &ApiClient) -> Result<(), ServiceError> {
    if let Some(session) = client.session_store().get() {
        if session.access_token().is_some() {
            let revoke = RequestDescriptor::post(ACCESS_LOGOUT_PATH, json!({}));
            if let Err(err) = client.send_once(revoke).await {
                tracing::warn!("could not revoke access token: {err}");
            }
        }
        if let Some(refresh_token) = session.refresh_token() {
            let revoke = RequestDescriptor::post(REFRESH_LOGOUT_PATH, json!({}))
                .with_header("Authorization", format!("Bearer {refresh_token}"));
            if let Err(err) = client.send_once(revoke).await {
                tracing::warn!("could not revoke refresh token: {err}");
            }
        }
    }
    client.session_store().clear()?;
    Ok(())
}

pub async fn verify(client: &ApiClient, email: &str, code: &str) -> Result<Value, ServiceError> {
    json_of(
        client
            .send_once(RequestDescriptor::post(
                "/v1/verify",
                json!({ "email": email, "code": code }),
            ))
            .await,
    )
}

/// Session currently persisted, if any.
pub fn current_user(client: &ApiClient) -> Option<Session> {
    client.session_store().get()
}

/// Exchange the refresh token now. The session is cleared when this fails.
pub async fn refresh_token(client: &ApiClient) -> Result<Session, ServiceError> {
    let has_refresh = current_user(client).is_some_and(|s| s.refresh_token().is_some());
    if !has_refresh {
        return Err(ServiceError::Invalid(
            "No refresh token available".to_string(),
        ));
    }
    Ok(client.refresh_session().await?)
}
