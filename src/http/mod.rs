//! HTTP error layer: response classification, rate-limit cooldown and retries.

mod client;
mod rate_limit;
mod response;
mod retry;

pub use client::HttpClient;
pub use rate_limit::{DEFAULT_RATE_LIMIT_WAIT, RateLimitCooldown};
pub use response::{RawResponse, classify};
pub use retry::{
    BASE_DELAY_SECS, LogObserver, MAX_ATTEMPTS, MAX_DELAY_SECS, RetryConfig, RetryObserver,
    RetryPolicy,
};
