//! Reader profile calls.

use serde_json::Value;

use super::{encode_component, json_of};
use crate::api::ApiClient;
use crate::error::ServiceError;

pub async fn create(client: &ApiClient, data: Value) -> Result<Value, ServiceError> {
    json_of(client.post("/v1/profiles", data).await)
}

/// Profile of the logged-in reader.
pub async fn get(client: &ApiClient) -> Result<Value, ServiceError> {
    json_of(client.get("/v1/profiles").await)
}

pub async fn get_by_display_name(
    client: &ApiClient,
    display_name: &str,
) -> Result<Value, ServiceError> {
    json_of(
        client
            .get(&format!("/v1/profiles/{}", encode_component(display_name)))
            .await,
    )
}

pub async fn edit(client: &ApiClient, data: Value) -> Result<Value, ServiceError> {
    json_of(client.patch("/v1/profiles", data).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiResponse, Method};
    use crate::session::MemorySessionStore;
    use crate::testsupport::{test_config, ScriptedTransport};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn display_name_lookup_is_encoded() {
        let transport = ScriptedTransport::new(|_| {
            Ok(ApiResponse::json_body(200, &json!({"display_name": "ada l"})))
        });
        let client = ApiClient::with_transport(
            &test_config(),
            transport.clone(),
            Arc::new(MemorySessionStore::new()),
        );

        let profile = get_by_display_name(&client, "ada l").await.expect("found");
        assert_eq!(profile["display_name"], "ada l");
        assert_eq!(transport.requests()[0].path(), "/v1/profiles/ada%20l");
    }

    #[tokio::test]
    async fn edit_uses_patch() {
        let transport = ScriptedTransport::new(|_| Ok(ApiResponse::json_body(200, &json!({}))));
        let client = ApiClient::with_transport(
            &test_config(),
            transport.clone(),
            Arc::new(MemorySessionStore::new()),
        );

        edit(&client, json!({"bio": "reads a lot"})).await.expect("ok");
        let sent = transport.requests();
        assert_eq!(sent[0].method, Method::Patch);
        assert_eq!(sent[0].body.as_ref().unwrap()["bio"], "reads a lot");
    }
}
