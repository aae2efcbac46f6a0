//! Shared test fixtures for session, config and client test modules.
//!
//! Keeping the temp-dir fixture and the scripted transport here prevents each
//! test module from rebuilding its own fake backend.

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

use crate::api::{ApiResponse, AuthEvents, PreparedRequest, Transport};
use crate::config::Config;
use crate::error::ApiError;

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!("bookvault-{prefix}-{millis}-{suffix}"));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write UTF-8 text to a child path, creating parent directories as needed.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Default config pointed at a fake host.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.api.base_url = "http://backend.test".to_string();
    config
}

type Handler = dyn Fn(&PreparedRequest) -> Result<ApiResponse, ApiError> + Send + Sync;

/// Transport whose every reply comes from a closure.
///
/// Calls are recorded with their (tokio) arrival time so paused-clock tests
/// can assert on backoff delays.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    latency: Duration,
    calls: Mutex<Vec<(Instant, PreparedRequest)>>,
}

impl ScriptedTransport {
    pub fn new(
        handler: impl Fn(&PreparedRequest) -> Result<ApiResponse, ApiError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Self::with_latency(Duration::ZERO, handler)
    }

    /// Like [`ScriptedTransport::new`], but every reply is delayed so calls overlap.
    pub fn with_latency(
        latency: Duration,
        handler: impl Fn(&PreparedRequest) -> Result<ApiResponse, ApiError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            latency,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }

    pub fn count_path(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, request)| request.path() == path)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: PreparedRequest) -> Result<ApiResponse, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), request.clone()));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        (self.handler)(&request)
    }
}

/// [`AuthEvents`] hook that records redirect requests.
#[derive(Default)]
pub struct RecordingEvents {
    route: Option<String>,
    redirects: Mutex<Vec<String>>,
}

impl RecordingEvents {
    pub fn on_route(route: &str) -> Self {
        Self {
            route: Some(route.to_string()),
            redirects: Mutex::new(Vec::new()),
        }
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl AuthEvents for RecordingEvents {
    fn current_route(&self) -> Option<String> {
        self.route.clone()
    }

    fn on_unauthenticated(&self, login_route: &str) {
        self.redirects.lock().unwrap().push(login_route.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;

    #[test]
    fn temp_dir_fixture_writes_and_resolves_paths() {
        let fixture = TestTempDir::new("fixture");
        let file = fixture.write_text("nested/file.txt", "hello");
        assert_eq!(fs::read_to_string(file).unwrap(), "hello");
        assert!(fixture.path().join("nested").is_dir());
    }

    #[tokio::test]
    async fn scripted_transport_records_calls() {
        let transport = ScriptedTransport::new(|req| Ok(ApiResponse::new(200, req.path())));
        let request = PreparedRequest {
            method: Method::Get,
            url: "http://backend.test/v1/books".to_string(),
            headers: Vec::new(),
            body: None,
            form: None,
            timeout: Duration::from_secs(1),
        };
        let response = transport.execute(request).await.unwrap();
        assert_eq!(response.text(), "/v1/books");
        assert_eq!(transport.count_path("/v1/books"), 1);
    }
}
