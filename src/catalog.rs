//! Public OpenLibrary lookups used to prefill new books.
//!
//! These calls never carry credentials and are not retried.

use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{ApiResponse, HttpTransport, RequestDescriptor, Transport};
use crate::error::ApiError;
use crate::services::encode_component;

pub const OPEN_LIBRARY_URL: &str = "https://openlibrary.org";

const SEARCH_FIELDS: &str =
    "key,title,author_name,number_of_pages_median,first_publish_year,cover_edition_key,isbn";
const CATALOG_TIMEOUT: Duration = Duration::from_secs(15);

/// One search hit, restricted to the fields requested.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    pub key: String,
    pub title: String,
    pub author_name: Vec<String>,
    pub number_of_pages_median: Option<u32>,
    pub first_publish_year: Option<i32>,
    pub cover_edition_key: Option<String>,
    pub isbn: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    docs: Vec<CatalogEntry>,
}

pub struct CatalogClient {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl CatalogClient {
    pub fn new() -> Self {
        Self::with_transport(OPEN_LIBRARY_URL, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, path: &str) -> Result<ApiResponse, ApiError> {
        let request = RequestDescriptor::get(path).prepare(&self.base_url, CATALOG_TIMEOUT);
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(ApiError::status(response.status, response.text()));
        }
        Ok(response)
    }

    /// Search editions by ISBN.
    pub async fn search_isbn(&self, isbn: &str) -> Result<Vec<CatalogEntry>, ApiError> {
        let path = format!(
            "/search.json?isbn={}&fields={SEARCH_FIELDS}",
            encode_component(isbn.trim())
        );
        let response: SearchResponse = self.fetch(&path).await?.json()?;
        Ok(response.docs)
    }

    /// Fetch a work record by its key, e.g. `/works/OL45804W`.
    pub async fn works(&self, key: &str) -> Result<Value, ApiError> {
        let key = if key.starts_with('/') {
            key.to_string()
        } else {
            format!("/{key}")
        };
        self.fetch(&format!("{key}.json")).await?.json_value()
    }
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new()
    }
}
