//! Store client configuration.
//!
//! Everything is reached through a single API gateway. Override the
//! defaults via environment variables or explicit construction for tests.

use url::Url;

/// Default gateway when `SFL_GATEWAY_URL` is unset.
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8078";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for reaching the Contract Store and User Directory.
///
/// Custom `Debug` implementation redacts the `api_token` field.
#[derive(Clone)]
pub struct StoreApiConfig {
    /// Gateway base URL. Service context paths (`/contract/api`,
    /// `/user/api`) are appended to it.
    pub gateway_url: Url,
    /// Bearer token sent on every request, if any.
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for StoreApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreApiConfig")
            .field("gateway_url", &self.gateway_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl StoreApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SFL_GATEWAY_URL` (default: `http://localhost:8078`)
    /// - `SFL_API_TOKEN` (optional)
    /// - `SFL_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("SFL_GATEWAY_URL").unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string());
        Ok(Self {
            gateway_url: parse_url("SFL_GATEWAY_URL", &raw)?,
            api_token: std::env::var("SFL_API_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            timeout_secs: std::env::var("SFL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Configuration pointing at a gateway on localhost (for testing).
    pub fn local_mock(port: u16) -> Result<Self, ConfigError> {
        Ok(Self {
            gateway_url: parse_url("localhost", &format!("http://127.0.0.1:{port}"))?,
            api_token: None,
            timeout_secs: 5,
        })
    }

    /// Configuration for an explicit gateway URL.
    pub fn with_gateway(raw: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            gateway_url: parse_url("gateway", raw)?,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// The gateway URL without a trailing slash, ready for path joining.
    pub(crate) fn base(&self) -> String {
        self.gateway_url.as_str().trim_end_matches('/').to_string()
    }
}

fn parse_url(source: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(source.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(
            source.to_string(),
            format!("unsupported scheme {:?}", url.scheme()),
        ));
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("API token is not a valid header value")]
    InvalidToken,
}
