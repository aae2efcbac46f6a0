//! HTTP client for the BookVault backend.
//!
//! The API layer is split into cohesive modules:
//! - `types`: request descriptors and raw responses
//! - `client`: dispatch, bearer injection, retries and session refresh
//! - `connectivity`: the `/health` probe

use crate::error::ApiError;
use async_trait::async_trait;

mod client;
mod connectivity;
mod types;

pub use client::{ApiClient, AuthEvents, AuthState, HttpTransport, RetryPolicy, LOGIN_ROUTE, PUBLIC_ROUTES};
pub use connectivity::{ConnectionStatus, HEALTH_PATH};
pub use types::{
    content_type_for, ApiResponse, FilePart, Method, MultipartBody, PreparedRequest, RequestDescriptor,
};

/// One HTTP exchange with the backend.
///
/// This trait lets tests script backend behavior without network calls while
/// the production path uses [`HttpTransport`]. Implementations return every
/// received response as `Ok`, whatever its status; only a missing response
/// is an error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: PreparedRequest) -> Result<ApiResponse, ApiError>;
}
