//! Maps completed HTTP responses to parsed JSON or a typed error.

use log::debug;
use reqwest::header::RETRY_AFTER;
use serde_json::{Map, Value};

use crate::error::{ApiError, Error, ResponseBody, Result};

/// The parts of an HTTP response the error layer looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Value of the `Retry-After` header, if any.
    pub retry_after: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }

    /// Drains a `reqwest` response. Failing to read the body is a transport error.
    pub async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string());
        let body = response.text().await?;

        Ok(Self {
            status,
            retry_after,
            body,
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn classify(&self, service: &str) -> Result<Value> {
        classify(self.status, &self.body, service)
    }
}

/// Classifies a response by status code.
///
/// 2xx bodies are decoded as JSON (an empty body decodes to `null`).
/// 401/403 become [`ErrorKind::Authentication`](crate::ErrorKind::Authentication),
/// 429 becomes `RateLimit` and every other status becomes `Generic`.
pub fn classify(status: u16, body: &str, service: &str) -> Result<Value> {
    if (200..300).contains(&status) {
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(body).map_err(|e| {
            debug!("{} returned an undecodable success body: {}", service, e);
            Error::from(ApiError::generic(
                format!("{} API error: {} - invalid JSON in response body", service, status),
                Some(status),
                None,
            ))
        });
    }

    let message = error_message(status, body, service);
    let captured = Some(capture_body(body));

    let error = match status {
        401 | 403 => ApiError::authentication(message, status, captured),
        429 => ApiError::rate_limit(message, captured),
        _ => ApiError::generic(message, Some(status), captured),
    };
    Err(error.into())
}

/// `"{service} API error: {status}"`, followed by ` - {detail}` when the body
/// has something to say.
pub(crate) fn error_message(status: u16, body: &str, service: &str) -> String {
    let mut message = format!("{} API error: {}", service, status);

    let detail = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("message") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        _ => body.to_string(),
    };

    if !detail.trim().is_empty() {
        message.push_str(" - ");
        message.push_str(&detail);
    }
    message
}

/// The decoded error body if it is a JSON object, otherwise the raw text
/// wrapped as `{"message": raw}`.
pub(crate) fn capture_body(body: &str) -> ResponseBody {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => {
            let mut map = Map::new();
            map.insert("message".to_string(), Value::String(body.to_string()));
            map
        }
    }
}
