//! Note calls. These are sent once, without retries.

use serde_json::Value;

use super::{encode_component, json_of};
use crate::api::{ApiClient, Method, RequestDescriptor};
use crate::error::ServiceError;

fn note_path(id: &str) -> String {
    format!("/v1/notes/{}", encode_component(id))
}

pub async fn edit(client: &ApiClient, id: &str, data: Value) -> Result<Value, ServiceError> {
    let descriptor = RequestDescriptor::new(Method::Patch, note_path(id)).with_body(data);
    json_of(client.send_once(descriptor).await)
}

pub async fn remove(client: &ApiClient, id: &str) -> Result<Value, ServiceError> {
    let descriptor = RequestDescriptor::new(Method::Delete, note_path(id));
    json_of(client.send_once(descriptor).await)
}
