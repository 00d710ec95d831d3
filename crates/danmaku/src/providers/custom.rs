//! User-configured comment provider.
//!
//! Called as `{endpoint}/{token}/api/v2/comment?url={encoded video url}`.
//! Two response envelopes are in use:
//!
//! - `{ "success": true, "comments": [...] }`
//! - `{ "code": 0, "data": [...] }`
//!
//! Items are either packed (`{ "p": "time,mode,color,...", "m": "text" }`) or
//! plain objects with `text`/`time`/`color`/`mode` fields.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{fetch_text, host_name};
use crate::error::{DanmakuError, Result};
use crate::filter::ContentFilter;
use crate::message::{CommentEntry, DanmuMode, ProviderTier, format_color, parse_color};
use crate::parser::{entry_from_attributes, unescape_text};
use crate::provider::CommentSource;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    comments: Option<Vec<Value>>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    data: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CustomComment {
    Packed {
        p: String,
        m: String,
    },
    Plain {
        #[serde(alias = "content")]
        text: String,
        #[serde(alias = "timeSeconds")]
        time: f64,
        #[serde(default)]
        color: Option<Value>,
        #[serde(default)]
        mode: Option<Value>,
    },
}

impl CustomComment {
    fn into_entry(self) -> Option<CommentEntry> {
        match self {
            Self::Packed { p, m } => entry_from_attributes(&p, &unescape_text(&m)),
            Self::Plain {
                text,
                time,
                color,
                mode,
            } => {
                let color = match color {
                    Some(Value::Number(n)) => n.as_i64().map(format_color),
                    Some(Value::String(s)) => Some(parse_color(&s)),
                    _ => None,
                };
                let mode = match mode {
                    Some(Value::Number(n)) => n
                        .as_f64()
                        .filter(|f| f.fract() == 0.0)
                        .map(|f| DanmuMode::from_source_code(f as i64)),
                    Some(Value::String(s)) => Some(DanmuMode::from_position(&s)),
                    _ => None,
                };
                let mut entry = CommentEntry::new(text, time).with_mode(mode.unwrap_or_default());
                if let Some(color) = color {
                    entry = entry.with_color(color);
                }
                Some(entry)
            }
        }
    }
}

/// Parse a custom provider body in either envelope.
pub fn parse_response(body: &str) -> Result<Vec<CommentEntry>> {
    let envelope: Envelope = serde_json::from_str(body)?;
    let items = match envelope {
        Envelope {
            success: Some(true),
            comments: Some(items),
            ..
        } => items,
        Envelope {
            code: Some(0),
            data: Some(items),
            ..
        } => items,
        _ => return Err(DanmakuError::parse("unrecognized custom provider response")),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<CustomComment>(item).ok())
        .filter_map(CustomComment::into_entry)
        .collect())
}

/// Provider at a user-configured endpoint.
pub struct CustomProvider {
    client: Client,
    endpoint: String,
    token: String,
    filter: ContentFilter,
    name: String,
}

impl CustomProvider {
    /// Create a provider for `endpoint` authenticated by `token`.
    pub fn new(client: Client, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            client,
            name: host_name(&endpoint),
            endpoint,
            token: token.into(),
            filter: ContentFilter::default(),
        }
    }

    /// Replace the content filter.
    pub fn with_filter(mut self, filter: ContentFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Request URL for `video_url`.
    pub fn request_url(&self, video_url: &str) -> String {
        format!(
            "{}/{}/api/v2/comment?url={}",
            self.endpoint.trim_end_matches('/'),
            self.token.trim_matches('/'),
            urlencoding::encode(video_url)
        )
    }
}

#[async_trait]
impl CommentSource for CustomProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Custom
    }

    async fn fetch(&self, platform: &str, video_url: &str) -> Result<Vec<CommentEntry>> {
        let url = self.request_url(video_url);
        let body = fetch_text(self.client.get(&url), &url).await?;
        let parsed = parse_response(&body)?;
        let parsed_count = parsed.len();
        let entries = self.filter.apply(parsed);
        debug!(
            provider = %self.name,
            platform = %platform,
            parsed = parsed_count,
            kept = entries.len(),
            "Custom provider returned comments"
        );
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_with_packed_items() {
        let body = r#"{"success":true,"count":2,"comments":[
            {"cid":1,"p":"12.5,4,16711680,[tencent]","m":"顶部红色弹幕"},
            {"cid":2,"p":"13,1,16777215","m":"第二条&amp;弹幕"}
        ]}"#;
        let entries = parse_response(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].mode, DanmuMode::Top);
        assert_eq!(entries[0].color, "#FF0000");
        assert_eq!(entries[1].text, "第二条&弹幕");
    }

    #[test]
    fn test_code_envelope_with_plain_items() {
        let body = r##"{"code":0,"data":[
            {"text":"普通弹幕","time":3.5,"color":"#00ff00","mode":"bottom"},
            {"content":"另一条","time":4,"color":255},
            {"unexpected":"shape"}
        ]}"##;
        let entries = parse_response(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].color, "#00FF00");
        assert_eq!(entries[0].mode, DanmuMode::Bottom);
        assert_eq!(entries[1].color, "#0000FF");
    }

    #[test]
    fn test_unknown_envelope_is_error() {
        assert!(parse_response(r#"{"success":false,"errorMessage":"bad token"}"#).is_err());
        assert!(parse_response(r#"{"code":500,"data":[]}"#).is_err());
        assert!(parse_response("<html>").is_err());
    }

    #[test]
    fn test_request_url() {
        let provider = CustomProvider::new(Client::new(), "https://danmu.example/", "/secret/");
        assert_eq!(
            provider.request_url("https://v.qq.com/x.html"),
            "https://danmu.example/secret/api/v2/comment?url=https%3A%2F%2Fv.qq.com%2Fx.html"
        );
        assert_eq!(provider.name(), "danmu.example");
    }
}
