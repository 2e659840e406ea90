//! Credential headers and token format checks.

use reqwest::header::{HeaderValue, InvalidHeaderValue};
use std::fmt;

/// How a token is presented in the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `Authorization: Bearer <token>` (Coda, Google).
    Bearer(String),
    /// `Authorization: token <token>` (GitHub).
    Token(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Bearer(t) => f.debug_tuple("Bearer").field(&redact(t)).finish(),
            Credentials::Token(t) => f.debug_tuple("Token").field(&redact(t)).finish(),
        }
    }
}

impl Credentials {
    pub fn token(&self) -> &str {
        match self {
            Credentials::Bearer(t) | Credentials::Token(t) => t,
        }
    }

    pub fn header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let raw = match self {
            Credentials::Bearer(t) => format!("Bearer {}", t),
            Credentials::Token(t) => format!("token {}", t),
        };
        let mut value = HeaderValue::from_str(&raw)?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Token shapes known per service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFormat {
    /// Alphanumeric, at least 20 characters.
    Coda,
    /// 40 hex characters.
    GitHub,
    /// At least 50 characters.
    Google,
    /// Any non-empty token.
    Any,
}

pub fn validate_token_format(token: &str, format: TokenFormat) -> bool {
    if token.is_empty() {
        return false;
    }

    match format {
        TokenFormat::Coda => {
            token.chars().count() >= 20 && token.chars().all(|c| c.is_alphanumeric())
        }
        TokenFormat::GitHub => token.len() == 40 && token.chars().all(|c| c.is_ascii_hexdigit()),
        TokenFormat::Google => token.chars().count() >= 50,
        TokenFormat::Any => true,
    }
}

/// Shortens a token for log output.
pub fn redact(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
