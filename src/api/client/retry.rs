//! Retry policy for transient API failures.

use crate::config::ApiConfig;
use crate::error::ApiError;
use std::time::Duration;

/// Bounded linear-backoff retry policy used by `ApiClient`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first request.
    pub max_retries: u32,
    /// Delay step; retry `n` waits `n * base_delay`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(800),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(api: &ApiConfig) -> Self {
        Self {
            max_retries: api.max_retries,
            base_delay: api.retry_delay(),
        }
    }

    /// No retries at all.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Decide whether another attempt should follow `retries_done` retries.
    ///
    /// Only network failures and 5xx responses qualify; every 4xx and every
    /// session failure is final.
    pub fn should_retry(&self, err: &ApiError, retries_done: u32) -> bool {
        if retries_done >= self.max_retries {
            return false;
        }
        match err {
            ApiError::Network { .. } => true,
            ApiError::Status { code, .. } => (500..=599).contains(code),
            ApiError::Unauthorized(_) | ApiError::InvalidResponse(_) => false,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(retry)
    }
}
