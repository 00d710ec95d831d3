//! Request and response models.

use platforms_resolver::MediaQuery;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;

/// Output format of `GET /api/danmu`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Xml,
}

impl OutputFormat {
    pub fn parse(value: Option<&str>) -> Result<Self, ApiError> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(Self::Json),
            Some(v) if v.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(v) if v.eq_ignore_ascii_case("xml") => Ok(Self::Xml),
            Some(other) => Err(ApiError::bad_request(format!(
                "unsupported format '{}', expected json or xml",
                other
            ))),
        }
    }
}

/// Query parameters of `GET /api/danmu`.
///
/// Every field is optional at the extractor level so that a missing
/// identity is reported by the service with the regular error body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DanmuQuery {
    pub media_id: Option<String>,
    pub title: Option<String>,
    pub year: Option<String>,
    pub episode: Option<String>,
    pub format: Option<String>,
}

impl DanmuQuery {
    pub fn to_media_query(&self) -> MediaQuery {
        MediaQuery {
            media_id: self.media_id.clone(),
            title: self.title.clone(),
            year: self.year.clone(),
            episode: self.episode.clone(),
        }
    }
}

/// Liveness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct LiveResponse {
    pub status: String,
    pub uptime_secs: u64,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Registered provider tiers, custom provider excluded
    pub providers: usize,
}
