//! Third-party markup provider.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{fetch_text, host_name, proxy_url};
use crate::error::Result;
use crate::filter::ContentFilter;
use crate::message::{CommentEntry, ProviderTier};
use crate::parser::parse_markup;
use crate::provider::CommentSource;

/// Provider serving `<d>` markup at `GET {base}/?url=...`.
pub struct MarkupProvider {
    client: Client,
    base_url: String,
    filter: ContentFilter,
    name: String,
}

impl MarkupProvider {
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

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CommentSource for MarkupProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Markup
    }

    async fn fetch(&self, platform: &str, video_url: &str) -> Result<Vec<CommentEntry>> {
        let url = proxy_url(&self.base_url, video_url);
        let body = fetch_text(self.client.get(&url), &url).await?;
        let parsed = parse_markup(&body);
        let parsed_count = parsed.len();
        let entries = self.filter.apply(parsed);
        debug!(
            provider = %self.name,
            platform = %platform,
            bytes = body.len(),
            parsed = parsed_count,
            kept = entries.len(),
            "Markup provider returned comments"
        );
        Ok(entries)
    }
}
