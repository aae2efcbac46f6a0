//! Stored file calls, including the CSV import upload.

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::{encode_component, json_of, surface};
use crate::api::{ApiClient, FilePart, Method, MultipartBody, RequestDescriptor};
use crate::error::ServiceError;

/// Layout of an uploaded import file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportFormat {
    /// BookVault's own export columns.
    #[default]
    Csv,
    /// A Goodreads library export.
    Goodreads,
}

impl ImportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Goodreads => "goodreads",
        }
    }
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "goodreads" => Ok(Self::Goodreads),
            other => Err(format!("unknown import type `{other}`: expected csv or goodreads")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    pub format: ImportFormat,
    /// Import rows whose ISBN is already on the shelf.
    pub allow_duplicates: bool,
}

pub async fn list(client: &ApiClient) -> Result<Value, ServiceError> {
    json_of(client.get("/v1/files").await)
}

/// Raw contents of one stored file.
pub async fn get(client: &ApiClient, filename: &str) -> Result<Vec<u8>, ServiceError> {
    let response = client
        .get(&format!("/v1/files/{}", encode_component(filename)))
        .await?;
    Ok(response.body)
}

/// Build the multipart form the import endpoint expects.
pub fn upload_form(filename: &str, bytes: Vec<u8>, options: &ImportOptions) -> MultipartBody {
    MultipartBody::new(FilePart::new("file", filename, bytes))
        .with_field("type", options.format.as_str())
        .with_field("allow_duplicates", options.allow_duplicates.to_string())
}

/// Upload a file for import into the library.
///
/// Goes through the retrying dispatcher like any other call.
pub async fn upload(
    client: &ApiClient,
    filename: &str,
    bytes: Vec<u8>,
    options: &ImportOptions,
) -> Result<Value, ServiceError> {
    let filename = filename.trim();
    if filename.is_empty() {
        return Err(ServiceError::Invalid("No file uploaded.".to_string()));
    }
    let request = RequestDescriptor::new(Method::Post, "/v1/files")
        .with_form(upload_form(filename, bytes, options));
    let response = client
        .send(request)
        .await
        .map_err(|err| surface(err, &[(400, "Unable to read the uploaded file")]))?;
    Ok(response.json_value()?)
}
