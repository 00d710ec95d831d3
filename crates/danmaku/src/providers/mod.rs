//! Comment provider implementations.
//!
//! - [`CustomProvider`] - user-configured endpoint (either of two JSON schemas)
//! - [`MarkupProvider`] - third-party provider returning `<d>` markup
//! - [`JsonProvider`] - third-party provider returning array rows

pub mod custom;
pub mod json;
pub mod markup;

pub use custom::CustomProvider;
pub use json::JsonProvider;
pub use markup::MarkupProvider;

use reqwest::RequestBuilder;

use crate::error::{DanmakuError, Result};

/// Send `request` and read the body as text, failing on non-success statuses.
pub(crate) async fn fetch_text(request: RequestBuilder, url: &str) -> Result<String> {
    let response = request
        .send()
        .await
        .map_err(|e| DanmakuError::from_request(e, url))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DanmakuError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| DanmakuError::from_request(e, url))
}

/// `GET {base}/?url={encoded video url}`
pub(crate) fn proxy_url(base: &str, video_url: &str) -> String {
    format!(
        "{}/?url={}",
        base.trim_end_matches('/'),
        urlencoding::encode(video_url)
    )
}

/// Host of `url`, for log lines.
pub(crate) fn host_name(url: &str) -> String {
    url.split("://")
        .nth(1)
        .unwrap_or(url)
        .split(['/', '?'])
        .next()
        .unwrap_or_default()
        .to_string()
}
