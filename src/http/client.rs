//! HTTP client that runs every request through the rate-limit cooldown, the
//! response classifier and the retry policy.

use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde_json::Value;
use std::sync::Arc;

use super::response::RawResponse;
use super::retry::{RetryObserver, RetryPolicy};
use crate::auth::{redact, validate_token_format};
use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};

/// JSON API client for a single service.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(credentials) = &config.credentials {
            if !validate_token_format(credentials.token(), config.token_format) {
                return Err(ApiError::validation(format!(
                    "Invalid {} API token format",
                    config.service
                ))
                .into());
            }
            let value = credentials.header_value().map_err(|e| {
                ApiError::validation(format!("Invalid {} credentials: {}", config.service, e))
            })?;
            headers.insert(AUTHORIZATION, value);
            debug!(
                "Using {} credentials: {}",
                config.service,
                redact(credentials.token())
            );
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let policy = RetryPolicy::new(config.retry);

        Ok(Self {
            client,
            config,
            policy,
        })
    }

    /// Replaces the retry observer, keeping the configured retry settings.
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.policy = RetryPolicy::with_observer(self.config.retry, observer);
        self
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_json(&self, path: &str) -> Result<Value> {
        self.send_json(Method::GET, path, &[], None).await
    }

    #[tracing::instrument(skip(self, query))]
    pub async fn get_json_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.send_json(Method::GET, path, query, None).await
    }

    #[tracing::instrument(skip(self, body))]
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.send_json(Method::POST, path, &[], Some(body)).await
    }

    #[tracing::instrument(skip(self, body))]
    pub async fn patch_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.send_json(Method::PATCH, path, &[], Some(body)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.send_json(Method::DELETE, path, &[], None).await
    }

    /// Sends a request and decodes the JSON response, retrying transient failures.
    #[tracing::instrument(skip(self, query, body))]
    pub async fn send_json(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.config.url_for(path);
        let operation = format!("{} {}", method, url);
        debug!("{} with query {:?}...", operation, query);

        self.policy
            .run(&operation, || self.send_once(method.clone(), &url, query, body))
            .await
    }

    /// One attempt: send, wait out a 429, then classify.
    async fn send_once(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut request = self.client.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(Error::from)?;
        let raw = RawResponse::read(response).await?;

        self.config.cooldown.check(&raw, &self.config.service).await?;
        raw.classify(&self.config.service)
    }
}
