//! Third-party JSON provider.
//!
//! Rows are arrays `[time, position, color, "", text, "", "", fontSize]`,
//! delivered either as a bare array or wrapped as `{ "danmuku": [...] }`.
//! Time, position and color may each arrive as a number or a string.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{fetch_text, host_name};
use crate::error::{DanmakuError, Result};
use crate::filter::ContentFilter;
use crate::message::{CommentEntry, DanmuMode, ProviderTier, format_color, parse_color};
use crate::parser::unescape_text;
use crate::provider::CommentSource;

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn row_to_entry(row: &Value) -> Option<CommentEntry> {
    let row = row.as_array()?;
    let time = number(row.first()?)?;
    let text = row.get(4)?.as_str()?;

    let mode = match row.get(1) {
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|f| f.fract() == 0.0)
            .map_or(DanmuMode::Scroll, |f| DanmuMode::from_position_code(f as i64)),
        Some(Value::String(s)) => DanmuMode::from_position(s),
        _ => DanmuMode::Scroll,
    };
    let color = match row.get(2) {
        Some(Value::Number(n)) => n.as_i64().map(format_color),
        Some(Value::String(s)) => Some(parse_color(s)),
        _ => None,
    };

    let mut entry = CommentEntry::new(unescape_text(text), time).with_mode(mode);
    if let Some(color) = color {
        entry = entry.with_color(color);
    }
    Some(entry)
}

/// Parse a JSON provider body; malformed rows are skipped.
pub fn parse_rows(body: &str) -> Result<Vec<CommentEntry>> {
    let value: Value = serde_json::from_str(body)?;
    let rows = match &value {
        Value::Array(rows) => rows,
        Value::Object(map) => map
            .get("danmuku")
            .and_then(Value::as_array)
            .ok_or_else(|| DanmakuError::parse("missing danmuku array"))?,
        _ => return Err(DanmakuError::parse("unexpected JSON provider body")),
    };
    Ok(rows.iter().filter_map(row_to_entry).collect())
}

/// Provider serving array rows at `GET {base}?url=...`.
pub struct JsonProvider {
    client: Client,
    base_url: String,
    filter: ContentFilter,
    name: String,
}

impl JsonProvider {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            name: host_name(&base_url),
            base_url,
            filter: ContentFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: ContentFilter) -> Self {
        self.filter = filter;
        self
    }
}

#[async_trait]
impl CommentSource for JsonProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Json
    }

    async fn fetch(&self, platform: &str, video_url: &str) -> Result<Vec<CommentEntry>> {
        let request = self.client.get(&self.base_url).query(&[("url", video_url)]);
        let body = fetch_text(request, &self.base_url).await?;
        let parsed = parse_rows(&body)?;
        let parsed_count = parsed.len();
        let entries = self.filter.apply(parsed);
        debug!(
            provider = %self.name,
            platform = %platform,
            parsed = parsed_count,
            kept = entries.len(),
            "JSON provider returned comments"
        );
        Ok(entries)
    }
}
