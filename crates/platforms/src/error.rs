use thiserror::Error;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, ResolverError>;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid media id: {0}")]
    InvalidMediaId(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no platform links found")]
    NoLinks,
    #[error("title search is not configured")]
    SearchUnavailable,
}

impl ResolverError {
    /// Classify a reqwest error, separating timeouts from other transport failures.
    pub fn from_request(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            Self::Timeout(url.to_string())
        } else {
            Self::Http(err)
        }
    }
}
