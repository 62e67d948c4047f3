//! Muninn error types

use std::time::Duration;

/// Muninn error types
///
/// `Clone` because listing errors fan out to every waiter of a
/// coalesced fetch through a shared future.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MuninnError {
    // Transport/upstream errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("subreddit not found: {0}")]
    SubredditNotFound(String),

    // Caller errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Summarization failure — scoped to a single post, never escalated
    /// to the listing response.
    #[error("summarization failed: {0}")]
    Summarization(String),

    #[error("empty response from upstream")]
    EmptyResponse,

    // Configuration errors
    #[error("no summarizer configured")]
    NoSummarizer,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl MuninnError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Transport failures and 5xx responses are transient. Rate limits
    /// count as transient too, but the retry layer caps them at a single
    /// retry before surfacing.
    pub fn is_transient(&self) -> bool {
        match self {
            MuninnError::Http(_) => true,
            MuninnError::RateLimited { .. } => true,
            MuninnError::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Server-provided wait hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            MuninnError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Result type alias for muninn operations
pub type Result<T> = std::result::Result<T, MuninnError>;
