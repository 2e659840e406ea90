use std::time::Duration;

use crate::auth::{Credentials, TokenFormat};
use crate::http::{RateLimitCooldown, RetryConfig};

/// Per-attempt deadline for a single HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_USER_AGENT: &str = concat!("apiguard/", env!("APIGUARD_VERSION"));

/// Everything an [`HttpClient`](crate::http::HttpClient) needs to talk to one service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Label used in error messages, e.g. "GitHub".
    pub service: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub credentials: Option<Credentials>,
    /// Shape the token must have; checked when the client is built.
    pub token_format: TokenFormat,
    pub retry: RetryConfig,
    pub cooldown: RateLimitCooldown,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service: service.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credentials: None,
            token_format: TokenFormat::Any,
            retry: RetryConfig::default(),
            cooldown: RateLimitCooldown::default(),
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_token_format(mut self, token_format: TokenFormat) -> Self {
        self.token_format = token_format;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cooldown(mut self, cooldown: RateLimitCooldown) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Joins `path` onto the base URL. Absolute URLs are used as they are.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("https://api.github.com/", "GitHub");
        assert_eq!(config.base_url, "https://api.github.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry, RetryConfig::default());
        assert_eq!(config.cooldown.default_wait(), Duration::from_secs(60));
        assert!(config.user_agent.starts_with("apiguard/"));
        assert!(config.credentials.is_none());
        assert_eq!(config.token_format, TokenFormat::Any);
    }

    #[test]
    fn test_url_for() {
        let config = ClientConfig::new("https://coda.io/apis/v1", "Coda");
        assert_eq!(config.url_for("/docs"), "https://coda.io/apis/v1/docs");
        assert_eq!(config.url_for("docs/abc"), "https://coda.io/apis/v1/docs/abc");
        assert_eq!(
            config.url_for("https://example.com/next?page=2"),
            "https://example.com/next?page=2"
        );
    }
}
