//! Application-wide error types.

use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
///
/// Upstream failures (resolver, providers, parsing) never reach this type;
/// they are absorbed inside the pipeline and show up as fewer comments.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::validation("mediaId or title is required");
        assert_eq!(
            err.to_string(),
            "Validation error: mediaId or title is required"
        );

        let err = Error::config("bad port");
        assert_eq!(err.to_string(), "Configuration error: bad port");
    }

    #[test]
    fn test_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
