//! Default configuration constants.
//!
//! Keeping defaults in one module lets the template, the loader and tests
//! share the same literals.

/// Embedded default `bookvault.toml` written by `bookvault init`.
pub(super) const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../templates/bookvault.toml");
/// Backend REST API root used when nothing is configured.
pub(super) const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
/// Timeout for ordinary API requests.
pub(super) const DEFAULT_API_TIMEOUT_SECS: u64 = 15;
/// Timeout for the `/health` connectivity probe.
pub(super) const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;
/// Additional attempts after the first on transient failures.
pub(super) const DEFAULT_MAX_RETRIES: u32 = 2;
/// Linear backoff step between retries.
pub(super) const DEFAULT_RETRY_DELAY_MS: u64 = 800;
