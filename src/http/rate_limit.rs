//! Cooldown for HTTP 429 responses.

use log::warn;
use std::time::Duration;

use super::response::{RawResponse, capture_body};
use crate::error::{ApiError, Result};

/// Wait used when a 429 carries no usable `Retry-After` header.
pub const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

/// Waits out a rate limit before reporting it.
///
/// The wait happens even though [`RetryPolicy`](super::RetryPolicy) never
/// retries a rate-limit error: the cooldown only delays the moment the caller
/// sees the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitCooldown {
    default_wait: Duration,
}

impl Default for RateLimitCooldown {
    fn default() -> Self {
        Self {
            default_wait: DEFAULT_RATE_LIMIT_WAIT,
        }
    }
}

impl RateLimitCooldown {
    pub fn new(default_wait: Duration) -> Self {
        Self { default_wait }
    }

    pub fn default_wait(&self) -> Duration {
        self.default_wait
    }

    /// How long to wait for a `Retry-After` value. Only whole seconds are
    /// understood; anything else falls back to the default wait.
    pub fn wait_for(&self, retry_after: Option<&str>) -> Duration {
        retry_after
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(self.default_wait)
    }

    /// Passes non-429 responses through. For a 429, sleeps and then fails
    /// with a rate-limit error.
    pub async fn check(&self, response: &RawResponse, service: &str) -> Result<()> {
        if response.status != 429 {
            return Ok(());
        }

        let wait = self.wait_for(response.retry_after.as_deref());
        warn!(
            "{} rate limit exceeded. Waiting {} seconds.",
            service,
            wait.as_secs()
        );
        tokio::time::sleep(wait).await;

        Err(ApiError::rate_limit(
            format!("{} rate limit exceeded", service),
            Some(capture_body(&response.body)),
        )
        .into())
    }
}
