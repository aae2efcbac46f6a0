//! Account settings calls. These are sent once, without retries.

use serde_json::Value;

use super::json_of;
use crate::api::{ApiClient, Method, RequestDescriptor};
use crate::error::ServiceError;

const SETTINGS_PATH: &str = "/v1/settings";

pub async fn get(client: &ApiClient) -> Result<Value, ServiceError> {
    json_of(client.send_once(RequestDescriptor::get(SETTINGS_PATH)).await)
}

pub async fn update(client: &ApiClient, data: Value) -> Result<Value, ServiceError> {
    let descriptor = RequestDescriptor::new(Method::Patch, SETTINGS_PATH).with_body(data);
    json_of(client.send_once(descriptor).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiResponse;
    use crate::session::MemorySessionStore;
    use crate::testsupport::{test_config, ScriptedTransport};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn update_patches_settings_once() {
        let transport = ScriptedTransport::new(|_| Ok(ApiResponse::new(503, "")));
        let client = ApiClient::with_transport(
            &test_config(),
            transport.clone(),
            Arc::new(MemorySessionStore::new()),
        );

        let err = update(&client, json!({"public_profile": true}))
            .await
            .expect_err("unavailable");
        assert_eq!(err.status_code(), Some(503));
        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Patch);
    }
}
