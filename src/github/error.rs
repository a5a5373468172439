use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failures raised by the GitHub gateway
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse {target} response: {source}")]
    Parse {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Rate limit exceeded. Limit will reset at {reset_at}")]
    RateLimitExceeded { reset_at: DateTime<Utc> },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl GitHubError {
    /// Whether this failure was caused by an exhausted API quota
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GitHubError::RateLimitExceeded { .. })
    }
}

pub type Result<T> = std::result::Result<T, GitHubError>;
