//! Configuration data model.

use serde::Deserialize;
use std::time::Duration;

use super::defaults::{
    DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS, DEFAULT_HEALTH_TIMEOUT_SECS,
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS,
};

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub app: AppConfig,
}

/// Backend connection and retry settings used by `ApiClient`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    #[serde(alias = "endpoint")]
    pub base_url: String,
    pub timeout_secs: u64,
    pub health_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            health_timeout_secs: DEFAULT_HEALTH_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl ApiConfig {
    /// Base URL without trailing slashes.
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim().trim_end_matches('/').to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs.max(1))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Application-level feature flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Demo deployments: login offers the shared demo account and `status`
    /// prints a notice that some features are disabled.
    pub demo_mode: bool,
    /// Skip the public landing page and open the library directly. Shares its
    /// name with the web build's env flag; see [`AppConfig::landing_route`].
    pub disable_homepage: bool,
    /// Debug-level request diagnostics. Off for production deployments.
    pub diagnostics: bool,
}

/// Shared account offered on demo deployments.
pub const DEMO_ACCOUNT: (&str, &str) = ("demo@bookvault.app", "demo");

/// Route shown to signed-in users and when the landing page is disabled.
pub const LIBRARY_ROUTE: &str = "/library";
/// Public landing page.
pub const HOME_ROUTE: &str = "/";

impl AppConfig {
    /// Demo credentials, only on demo deployments.
    pub fn demo_credentials(&self) -> Option<(&'static str, &'static str)> {
        self.demo_mode.then_some(DEMO_ACCOUNT)
    }

    /// Where a surface should start. Users with a session always land in the
    /// library; everyone does when the landing page is disabled.
    pub fn landing_route(&self, has_session: bool) -> &'static str {
        if self.disable_homepage || has_session {
            LIBRARY_ROUTE
        } else {
            HOME_ROUTE
        }
    }
}

/// Outcome of writing the default config template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigInitResult {
    Created(std::path::PathBuf),
    AlreadyExists(std::path::PathBuf),
}
