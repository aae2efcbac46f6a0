//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::multipart::{Form, Part};

use crate::api::types::{ApiResponse, MultipartBody, PreparedRequest};
use crate::api::Transport;
use crate::build_info;
use crate::error::ApiError;

/// Build the shared HTTP client. Timeouts are applied per request.
pub(super) fn build_http_client() -> reqwest::Client {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(agent) = HeaderValue::from_str(&build_info::user_agent()) {
        headers.insert(USER_AGENT, agent);
    }
    // Fall back to reqwest defaults if builder creation fails for any reason.
    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

fn multipart_form(body: &MultipartBody) -> Form {
    let file = &body.file;
    let part = Part::bytes(file.bytes.clone()).file_name(file.filename.clone());
    let part = match part.mime_str(&file.content_type) {
        Ok(part) => part,
        Err(_) => Part::bytes(file.bytes.clone()).file_name(file.filename.clone()),
    };
    body.fields
        .iter()
        .fold(Form::new(), |form, (name, value)| {
            form.text(name.clone(), value.clone())
        })
        .part(file.field.clone(), part)
}

/// Production [`Transport`] performing real HTTP exchanges.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            http: build_http_client(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: PreparedRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = self
            .http
            .request(request.method.to_reqwest(), &request.url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(form) = &request.form {
            // Sets its own multipart content type over the JSON default.
            builder = builder.multipart(multipart_form(form));
        } else if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(ApiResponse::new(status, body.to_vec()))
    }
}
