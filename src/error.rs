//! Error taxonomy shared by every API client.

use serde_json::{Map, Value};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Structured payload captured from an error response.
pub type ResponseBody = Map<String, Value>;

/// The kind of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Any non-2xx response that is not otherwise classified.
    Generic,
    /// HTTP 401 or 403.
    Authentication,
    /// HTTP 429.
    RateLimit,
    /// Malformed caller input.
    Validation,
    /// Transient condition that is neither a transport error nor a timeout.
    Retryable,
}

/// An error reported by (or on behalf of) a remote API.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    status_code: Option<u16>,
    response_body: Option<ResponseBody>,
}

impl ApiError {
    pub fn generic(
        message: impl Into<String>,
        status_code: Option<u16>,
        response_body: Option<ResponseBody>,
    ) -> Self {
        Self {
            kind: ErrorKind::Generic,
            message: message.into(),
            status_code,
            response_body,
        }
    }

    /// Authentication failure. `status_code` must be 401 or 403.
    pub(crate) fn authentication(
        message: impl Into<String>,
        status_code: u16,
        response_body: Option<ResponseBody>,
    ) -> Self {
        debug_assert!(matches!(status_code, 401 | 403));
        Self {
            kind: ErrorKind::Authentication,
            message: message.into(),
            status_code: Some(status_code),
            response_body,
        }
    }

    /// Rate limit exceeded; always carries status 429.
    pub(crate) fn rate_limit(
        message: impl Into<String>,
        response_body: Option<ResponseBody>,
    ) -> Self {
        Self {
            kind: ErrorKind::RateLimit,
            message: message.into(),
            status_code: Some(429),
            response_body,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            status_code: None,
            response_body: None,
        }
    }

    /// Marks a condition the caller knows to be transient.
    pub fn retryable(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            kind: ErrorKind::Retryable,
            message: message.into(),
            status_code,
            response_body: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn response_body(&self) -> Option<&ResponseBody> {
        self.response_body.as_ref()
    }
}

/// What went wrong below the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    /// Anything else, e.g. a malformed URL or a body that could not be read.
    Other,
}

/// A failure to complete the HTTP exchange at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {}", .kind.label(), .message)]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportErrorKind {
    fn label(self) -> &'static str {
        match self {
            TransportErrorKind::Connect => "connection error",
            TransportErrorKind::Timeout => "request timed out",
            TransportErrorKind::Other => "transport error",
        }
    }
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Connect, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, error.to_string())
    }
}

/// The error type returned by every fallible operation in this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Transport(error.into())
    }
}

/// Whether the retry policy may re-run an operation after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Retry,
    Fail,
}

impl Error {
    /// The retry table. Only connection errors, timeouts and explicit
    /// [`ErrorKind::Retryable`] errors are retried; a 429 is surfaced
    /// immediately even though the cooldown already waited for it.
    pub fn retry_disposition(&self) -> RetryDisposition {
        match self {
            Error::Transport(e) => match e.kind() {
                TransportErrorKind::Connect | TransportErrorKind::Timeout => {
                    RetryDisposition::Retry
                }
                TransportErrorKind::Other => RetryDisposition::Fail,
            },
            Error::Api(e) => match e.kind() {
                ErrorKind::Retryable => RetryDisposition::Retry,
                ErrorKind::Generic
                | ErrorKind::Authentication
                | ErrorKind::RateLimit
                | ErrorKind::Validation => RetryDisposition::Fail,
            },
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.retry_disposition() == RetryDisposition::Retry
    }

    /// The API error kind, or `None` for transport failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Api(e) => Some(e.kind()),
            Error::Transport(_) => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api(e) => e.status_code(),
            Error::Transport(_) => None,
        }
    }

    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            Error::Transport(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_table() {
        let cases = [
            (Error::from(TransportError::connect("refused")), true),
            (Error::from(TransportError::timeout("30s")), true),
            (
                Error::from(TransportError::new(TransportErrorKind::Other, "bad url")),
                false,
            ),
            (Error::from(ApiError::retryable("try again", Some(503))), true),
            (Error::from(ApiError::generic("boom", Some(500), None)), false),
            (Error::from(ApiError::authentication("nope", 401, None)), false),
            (Error::from(ApiError::rate_limit("slow down", None)), false),
            (Error::from(ApiError::validation("bad input")), false),
        ];

        for (error, retryable) in cases {
            assert_eq!(error.is_retryable(), retryable, "{:?}", error);
        }
    }

    #[test]
    fn test_rate_limit_carries_429() {
        let err = ApiError::rate_limit("GitHub rate limit exceeded", None);
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(err.status_code(), Some(429));
    }

    #[test]
    fn test_validation_has_no_status() {
        let err = Error::from(ApiError::validation("input must be a dictionary"));
        assert_eq!(err.kind(), Some(ErrorKind::Validation));
        assert_eq!(err.status_code(), None);
        assert_eq!(err.to_string(), "input must be a dictionary");
    }

    #[test]
    fn test_transport_error_display() {
        let err = Error::from(TransportError::timeout("operation timed out"));
        assert_eq!(err.to_string(), "request timed out: operation timed out");
        assert_eq!(err.kind(), None);
        assert!(err.as_api().is_none());
    }
}
