//! Background task calls. These are sent once, without retries.

use serde_json::Value;

use super::{encode_component, json_of};
use crate::api::{ApiClient, Method, RequestDescriptor};
use crate::error::ServiceError;

/// Queue a task; `task` carries its `type` and `data`.
pub async fn create(client: &ApiClient, task: Value) -> Result<Value, ServiceError> {
    json_of(
        client
            .send_once(RequestDescriptor::post("/v1/tasks", task))
            .await,
    )
}

pub async fn status(client: &ApiClient, id: &str) -> Result<Value, ServiceError> {
    let path = format!("/v1/tasks/{}", encode_component(id));
    json_of(client.send_once(RequestDescriptor::get(path)).await)
}

/// Re-run a failed task.
pub async fn retry(client: &ApiClient, id: &str) -> Result<Value, ServiceError> {
    let path = format!("/v1/tasks/{}/retry", encode_component(id));
    json_of(
        client
            .send_once(RequestDescriptor::new(Method::Post, path))
            .await,
    )
}
