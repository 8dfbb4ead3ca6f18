//! GET requests with backoff.
//!
//! Only reads come through here, so every retried request is idempotent.
//! A read is retried when the transport fails or the gateway answers 502,
//! 503 or 504 (the contract service restarting behind it). Any other
//! status goes back to the caller on the first answer. Mutations are sent
//! exactly once by the sub-clients themselves.
//!
//! The schedule is 200ms, 400ms, 800ms, cut short when the next wait would
//! push the read past the client's request timeout.

use std::time::{Duration, Instant};

use reqwest::StatusCode;

use crate::error::StoreApiError;
use crate::response;

/// Backoff schedule for one read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReadRetry {
    /// Requests sent at most, the first one included.
    pub attempts: u32,
    pub first_delay: Duration,
    /// Wall-clock ceiling for the whole read, waits included.
    pub budget: Duration,
}

impl ReadRetry {
    /// The default schedule, bounded by `budget`.
    pub(crate) fn within(budget: Duration) -> Self {
        Self {
            attempts: 4,
            first_delay: Duration::from_millis(200),
            budget,
        }
    }

    fn delay_before(&self, retry: u32) -> Duration {
        self.first_delay * 2u32.saturating_pow(retry)
    }
}

fn gateway_unavailable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

/// `GET url`, retried per `policy`.
///
/// The last answer wins: a gateway error that outlives the schedule is
/// returned as a response for [`response::check`] to classify, a transport
/// failure as [`StoreApiError::Http`].
pub(crate) async fn get(
    http: &reqwest::Client,
    policy: ReadRetry,
    endpoint: &str,
    url: &str,
) -> Result<reqwest::Response, StoreApiError> {
    let started = Instant::now();
    let mut retry = 0;
    loop {
        let outcome = http.get(url).send().await;
        let retryable = match &outcome {
            Ok(resp) => gateway_unavailable(resp.status()),
            Err(_) => true,
        };
        let delay = policy.delay_before(retry);
        if !retryable || retry + 1 >= policy.attempts || started.elapsed() + delay > policy.budget {
            return outcome.map_err(response::transport(endpoint));
        }

        match &outcome {
            Ok(resp) => tracing::warn!(
                endpoint,
                status = resp.status().as_u16(),
                retry = retry + 1,
                "gateway unavailable, retrying read in {delay:?}"
            ),
            Err(e) => tracing::warn!(
                endpoint,
                retry = retry + 1,
                error = %e,
                "read failed in transport, retrying in {delay:?}"
            ),
        }
        tokio::time::sleep(delay).await;
        retry += 1;
    }
}
