//! Errors from completion and search providers.

use reqwest::StatusCode;

/// Upstream provider failure.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The provider rejected the API key.
    #[error("Authentication rejected (HTTP {0})")]
    Auth(u16),

    /// Too many requests.
    #[error("Rate limited by provider")]
    RateLimited,

    /// Transport failure or other non-success HTTP status.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No API key in the environment.
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),
}

impl ProviderError {
    /// Maps statuses that have a dedicated variant.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Option<Self> {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(Self::Auth(status.as_u16())),
            StatusCode::TOO_MANY_REQUESTS => Some(Self::RateLimited),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        if let Some(mapped) = err.status().and_then(Self::from_status) {
            return mapped;
        }
        if err.is_decode() {
            return Self::InvalidResponse(err.to_string());
        }
        Self::Http(err)
    }
}
