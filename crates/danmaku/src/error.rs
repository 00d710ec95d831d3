//! Danmaku error types.

use thiserror::Error;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, DanmakuError>;

/// Errors a comment provider can run into.
///
/// None of these leave the provider chain: a failing tier counts as a tier
/// that returned nothing.
#[derive(Error, Debug)]
pub enum DanmakuError {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The call did not finish in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Non-success HTTP status
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// Malformed JSON body
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload arrived but had an unknown shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl DanmakuError {
    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Classify a reqwest error, separating timeouts from other transport failures.
    pub fn from_request(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            Self::Timeout(url.to_string())
        } else {
            Self::Http(err)
        }
    }
}
