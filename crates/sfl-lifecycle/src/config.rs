//! Lifecycle manager configuration.

use std::time::Duration;

/// Default bound on a single store call, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Upper bound on every store call. Expiry is reported as a transient
    /// failure.
    pub request_timeout: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl LifecycleConfig {
    /// Load from `SFL_REQUEST_TIMEOUT_SECS` (default: 30). Zero and
    /// unparsable values fall back to the default.
    pub fn from_env() -> Self {
        let secs = std::env::var("SFL_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Self {
            request_timeout: Duration::from_secs(secs),
        }
    }

    pub fn with_timeout(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}
