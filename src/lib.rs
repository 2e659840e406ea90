//! Shared retry and error-classification layer for thin vendor API clients.
//!
//! A request goes through [`http::RateLimitCooldown`], then [`http::classify`];
//! transient failures are re-run by [`http::RetryPolicy`].

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod validate;

pub use error::{
    ApiError, Error, ErrorKind, Result, RetryDisposition, TransportError, TransportErrorKind,
};
pub use validate::{validate_fields, validate_input};
