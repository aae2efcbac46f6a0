//! Library shelf calls.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{encode_component, json_of, surface};
use crate::api::ApiClient;
use crate::error::ServiceError;

/// Book submitted to the shelf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub isbn: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    /// Remaining fields (status, pages, cover, ...) forwarded as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewBook {
    /// Check required fields and trim the text ones.
    pub fn sanitized(&self) -> Result<Self, ServiceError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ServiceError::Invalid("Book title is required".to_string()));
        }
        let isbn = self.isbn.trim();
        if isbn.is_empty() {
            return Err(ServiceError::Invalid("Book ISBN is required".to_string()));
        }
        Ok(Self {
            title: title.to_string(),
            isbn: isbn.to_string(),
            author: self.author.trim().to_string(),
            description: self.description.trim().to_string(),
            extra: self.extra.clone(),
        })
    }
}

pub async fn add(client: &ApiClient, book: &NewBook) -> Result<Value, ServiceError> {
    let book = book.sanitized()?;
    let body = serde_json::to_value(&book)
        .map_err(|e| ServiceError::Invalid(format!("book could not be encoded: {e}")))?;
    let response = client.post("/v1/books", body).await.map_err(|err| {
        surface(
            err,
            &[
                (409, "Book already exists in your library"),
                (422, "Invalid book data"),
            ],
        )
    })?;
    Ok(response.json_value()?)
}

/// Build the shelf listing path. `page` is sent as `offset` only when positive.
pub fn list_path(status: Option<&str>, page: Option<u32>) -> String {
    let mut params = Vec::new();
    if let Some(status) = status.map(str::trim).filter(|s| !s.is_empty()) {
        params.push(format!("status={}", encode_component(status)));
    }
    if let Some(page) = page.filter(|p| *p > 0) {
        params.push(format!("offset={page}"));
    }
    if params.is_empty() {
        "/v1/books".to_string()
    } else {
        format!("/v1/books?{}", params.join("&"))
    }
}

pub async fn list(
    client: &ApiClient,
    status: Option<&str>,
    page: Option<u32>,
) -> Result<Value, ServiceError> {
    let response = client
        .get(&list_path(status, page))
        .await
        .map_err(|err| surface(err, &[(400, "Invalid request parameters")]))?;
    Ok(response.json_value()?)
}

pub async fn edit(client: &ApiClient, id: &str, data: Value) -> Result<Value, ServiceError> {
    json_of(
        client
            .patch(&format!("/v1/books/{}", encode_component(id)), data)
            .await,
    )
}

pub async fn remove(client: &ApiClient, id: &str) -> Result<Value, ServiceError> {
    json_of(
        client
            .delete(&format!("/v1/books/{}", encode_component(id)))
            .await,
    )
}

pub async fn notes(client: &ApiClient, id: &str) -> Result<Value, ServiceError> {
    json_of(
        client
            .get(&format!("/v1/books/{}/notes", encode_component(id)))
            .await,
    )
}

pub async fn add_note(client: &ApiClient, id: &str, data: Value) -> Result<Value, ServiceError> {
    json_of(
        client
            .post(&format!("/v1/books/{}/notes", encode_component(id)), data)
            .await,
    )
}

/// Shelf entry for one ISBN.
pub async fn status(client: &ApiClient, isbn: &str) -> Result<Value, ServiceError> {
    json_of(
        client
            .get(&format!("/v1/books/{}", encode_component(isbn)))
            .await,
    )
}

/// Reading statistics.
pub async fn stats(client: &ApiClient) -> Result<Value, ServiceError> {
    json_of(client.get("/v1/books/stats").await)
}
