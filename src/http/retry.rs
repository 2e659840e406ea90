//! Retry policy for network operations: an explicit retry table, exponential
//! backoff with jitter, and an attempt ceiling.

use log::{debug, warn};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{ApiError, Error, Result};

/// Default maximum number of attempts, the first one included.
pub const MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry, in seconds.
pub const BASE_DELAY_SECS: f64 = 1.0;

/// Default upper bound on the un-jittered delay, in seconds.
pub const MAX_DELAY_SECS: f64 = 60.0;

/// Retry settings. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    max_attempts: u32,
    base_delay: f64,
    max_delay: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: BASE_DELAY_SECS,
            max_delay: MAX_DELAY_SECS,
        }
    }
}

impl RetryConfig {
    /// `max_attempts` must be at least 1; delays are in seconds and must be
    /// finite and positive.
    pub fn new(max_attempts: u32, base_delay: f64, max_delay: f64) -> Result<Self> {
        if max_attempts == 0 {
            return Err(ApiError::validation("max_attempts must be a positive integer").into());
        }
        if !(base_delay.is_finite() && base_delay > 0.0) {
            return Err(
                ApiError::validation("base_delay must be a positive number of seconds").into(),
            );
        }
        if !(max_delay.is_finite() && max_delay > 0.0) {
            return Err(
                ApiError::validation("max_delay must be a positive number of seconds").into(),
            );
        }
        Ok(Self {
            max_attempts,
            base_delay,
            max_delay,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> f64 {
        self.base_delay
    }

    pub fn max_delay(&self) -> f64 {
        self.max_delay
    }

    /// Sleep after `attempt` (1-indexed) failed, jittered by the fractional
    /// second of the wall clock.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_delay_with(attempt, clock_fraction())
    }

    /// `min(base * 2^(attempt - 1), max)` plus `delay * 0.1 * (1 + fraction)`.
    /// `fraction` is clamped to `[0, 1)`.
    pub fn backoff_delay_with(&self, attempt: u32, fraction: f64) -> Duration {
        let exponent = attempt.saturating_sub(1).min(1023) as i32;
        let delay = (self.base_delay * 2f64.powi(exponent)).min(self.max_delay);
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 0.999_999)
        } else {
            0.0
        };
        let jitter = delay * 0.1 * (1.0 + fraction);
        Duration::try_from_secs_f64(delay + jitter).unwrap_or(Duration::MAX)
    }
}

fn clock_fraction() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| f64::from(d.subsec_nanos()) / 1_000_000_000.0)
        .unwrap_or(0.0)
}

/// Told about every retry before the policy sleeps.
#[cfg_attr(test, mockall::automock)]
pub trait RetryObserver: Send + Sync {
    fn on_retry(&self, operation: &str, attempt: u32, error: &Error, delay: Duration);
}

/// Logs each retry as a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl RetryObserver for LogObserver {
    fn on_retry(&self, operation: &str, attempt: u32, error: &Error, delay: Duration) {
        warn!(
            "Retrying {} after error: {} (attempt {} failed, waiting {:.2}s)",
            operation,
            error,
            attempt,
            delay.as_secs_f64()
        );
    }
}

/// Runs operations under a [`RetryConfig`].
#[derive(Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    observer: Arc<dyn RetryObserver>,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self::with_observer(config, Arc::new(LogObserver))
    }

    pub fn with_observer(config: RetryConfig, observer: Arc<dyn RetryObserver>) -> Self {
        Self { config, observer }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or has been attempted `max_attempts` times. The last error is
    /// returned unchanged.
    pub async fn run<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.config.max_attempts;
        let mut attempt = 1;

        loop {
            let error = match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => e,
            };

            if !error.is_retryable() {
                debug!("{}: non-retryable error: {}", operation_name, error);
                return Err(error);
            }

            if attempt >= max_attempts {
                debug!(
                    "{}: giving up after {} attempts: {}",
                    operation_name, attempt, error
                );
                return Err(error);
            }

            let delay = self.config.backoff_delay(attempt);
            self.observer.on_retry(operation_name, attempt, &error, delay);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
