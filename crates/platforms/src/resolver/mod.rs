//! Media query to platform links.
//!
//! [`PlatformResolver`] scrapes the aggregator detail page (desktop, then
//! mobile) through the shared [`RateLimitedFetcher`], and falls back to the
//! title-search service when the page yields nothing.

pub mod page;
pub mod search;

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ResolverError, Result};
use crate::extractor::ExtractorRegistry;
use crate::fetcher::{DEFAULT_MIN_INTERVAL, JitterRange, RateLimitedFetcher};
use crate::link::{MediaQuery, PlatformLink};

pub const DEFAULT_DETAIL_URL: &str = "https://movie.douban.com/subject/{id}/";
pub const DEFAULT_MOBILE_DETAIL_URL: &str = "https://m.douban.com/movie/subject/{id}/";

/// Turns a media query into per-platform watch links.
///
/// Never fails: anything that goes wrong is logged and shows up as fewer (or
/// no) links.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    async fn resolve(&self, query: &MediaQuery) -> Vec<PlatformLink>;
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Desktop detail page, `{id}` is replaced by the media id
    pub detail_url_template: String,
    /// Mobile detail page, tried when the desktop page has no links
    pub mobile_detail_url_template: String,
    /// Base URL of the title-search service; no fallback when unset
    pub search_api: Option<String>,
    pub page_timeout: Duration,
    pub search_timeout: Duration,
    /// Minimum spacing between two detail page fetches
    pub min_interval: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            detail_url_template: DEFAULT_DETAIL_URL.to_string(),
            mobile_detail_url_template: DEFAULT_MOBILE_DETAIL_URL.to_string(),
            search_api: None,
            page_timeout: Duration::from_secs(10),
            search_timeout: Duration::from_secs(10),
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }
}

impl ResolverConfig {
    pub fn with_search_api(mut self, api: impl Into<String>) -> Self {
        let api = api.into();
        self.search_api = (!api.trim().is_empty()).then(|| api.trim().to_string());
        self
    }
}

/// Production resolver.
pub struct PlatformResolver {
    fetcher: Arc<RateLimitedFetcher>,
    client: Client,
    registry: ExtractorRegistry,
    config: ResolverConfig,
}

impl PlatformResolver {
    pub fn new(client: Client, config: ResolverConfig) -> Self {
        let fetcher = Arc::new(RateLimitedFetcher::with_interval(
            client.clone(),
            config.min_interval,
        ));
        Self::with_fetcher(fetcher, config)
    }

    /// Share an existing fetcher, so several resolvers respect one rate limit.
    pub fn with_fetcher(fetcher: Arc<RateLimitedFetcher>, config: ResolverConfig) -> Self {
        Self {
            client: fetcher.client().clone(),
            fetcher,
            registry: ExtractorRegistry::with_defaults(),
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    /// Scrape the aggregator detail page of `media_id`.
    pub async fn resolve_primary(
        &self,
        media_id: &str,
        episode: Option<&str>,
    ) -> Result<Vec<PlatformLink>> {
        if !media_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ResolverError::InvalidMediaId(media_id.to_string()));
        }

        let pages = [
            (&self.config.detail_url_template, JitterRange::DETAIL_PAGE),
            (&self.config.mobile_detail_url_template, JitterRange::MOBILE_PAGE),
        ];

        let mut last_error = ResolverError::NoLinks;
        for (template, jitter) in pages {
            let url = template.replace("{id}", media_id);
            match self
                .fetcher
                .get_text(&url, jitter, self.config.page_timeout)
                .await
            {
                Ok(html) => {
                    let groups = page::extract_candidates(&html, &self.registry);
                    let links = page::select_links(&groups, episode);
                    if !links.is_empty() {
                        return Ok(links);
                    }
                    debug!(url = %url, "Detail page has no platform links");
                }
                Err(e) => {
                    debug!(url = %url, error = %e, "Detail page fetch failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    /// Title-search fallback.
    pub async fn resolve_by_title(
        &self,
        title: &str,
        year: Option<&str>,
        episode: Option<&str>,
    ) -> Result<Vec<PlatformLink>> {
        let api = self
            .config
            .search_api
            .as_deref()
            .ok_or(ResolverError::SearchUnavailable)?;
        let timeout = self.config.search_timeout;

        for keyword in search::title_variants(title) {
            let items = match search::search(&self.client, api, &keyword, timeout).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(keyword = %keyword, error = %e, "Title search failed");
                    continue;
                }
            };
            let Some(candidate) = search::rank_candidates(&items, title, year) else {
                continue;
            };

            let detail = match candidate.id() {
                Some(id) => match search::detail(&self.client, api, &id, timeout).await {
                    Ok(detail) => detail,
                    Err(e) => {
                        warn!(id = %id, error = %e, "Search detail lookup failed");
                        None
                    }
                },
                None => None,
            };
            let play_url = detail
                .as_ref()
                .map(|d| d.vod_play_url.as_str())
                .filter(|p| !p.is_empty())
                .unwrap_or(candidate.vod_play_url.as_str());

            let sources = search::split_playlist(play_url);
            let links = search::select_from_playlist(&sources, episode, &self.registry);
            if !links.is_empty() {
                debug!(keyword = %keyword, name = %candidate.vod_name, "Resolved through title search");
                return Ok(links);
            }
        }
        Err(ResolverError::NoLinks)
    }
}

#[async_trait]
impl LinkResolver for PlatformResolver {
    async fn resolve(&self, query: &MediaQuery) -> Vec<PlatformLink> {
        let episode = query.episode();

        if let Some(media_id) = query.media_id() {
            match self.resolve_primary(media_id, episode).await {
                Ok(links) => {
                    info!(media_id = %media_id, count = links.len(), "Resolved platform links");
                    return links;
                }
                Err(e) => warn!(media_id = %media_id, error = %e, "Detail page resolution failed"),
            }
        }

        if let Some(title) = query.title() {
            match self.resolve_by_title(title, query.year(), episode).await {
                Ok(links) => {
                    info!(title = %title, count = links.len(), "Resolved platform links by title");
                    return links;
                }
                Err(e) => warn!(title = %title, error = %e, "Title search resolution failed"),
            }
        }

        Vec::new()
    }
}
