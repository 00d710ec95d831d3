//! Danmu aggregation service.
//!
//! A request moves through [`PipelineStage`]s:
//! - **Resolving**: the query becomes per-platform watch links
//! - **Fetching**: one provider chain run per link, all links at once
//! - **Merging**: every platform's comments are merged and deduplicated
//!
//! A platform that yields nothing never fails the request; only a query with
//! neither a media id nor a title is rejected.

use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use danmaku::{
    ChainConfig, CommentEntry, CommentSource, CustomProvider, JsonProvider, MarkupProvider,
    ProviderChain, merge_platforms,
};
use platforms_resolver::{LinkResolver, MediaQuery, PlatformResolver};

use crate::config::{AppConfig, EnvSiteConfig, SiteConfigSource};
use crate::error::{Error, Result};

/// Where a request currently is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Resolving,
    Fetching,
    Merging,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Resolving => "resolving",
            Self::Fetching => "fetching",
            Self::Merging => "merging",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

/// Comments contributed by one platform link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSummary {
    pub platform: String,
    pub url: String,
    pub count: usize,
}

/// Merged result of one aggregation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResponse {
    pub danmu: Vec<CommentEntry>,
    pub platforms: Vec<PlatformSummary>,
    pub total: usize,
}

impl AggregateResponse {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Orchestrates resolution, provider chains and merging.
pub struct DanmuService {
    resolver: Arc<dyn LinkResolver>,
    site_config: Arc<dyn SiteConfigSource>,
    client: Client,
    /// Markup and JSON tiers, in order; the custom tier is prepended per request
    sources: Vec<Arc<dyn CommentSource>>,
    config: ChainConfig,
}

impl DanmuService {
    pub fn new(
        resolver: Arc<dyn LinkResolver>,
        site_config: Arc<dyn SiteConfigSource>,
        client: Client,
        config: ChainConfig,
    ) -> Self {
        Self {
            resolver,
            site_config,
            client,
            sources: Vec::new(),
            config,
        }
    }

    /// Wire the production resolver, providers and site config.
    pub fn from_config(config: &AppConfig, client: Client) -> Self {
        let resolver = PlatformResolver::new(client.clone(), config.resolver.clone());
        let mut service = Self::new(
            Arc::new(resolver),
            Arc::new(EnvSiteConfig),
            client.clone(),
            config.chain.clone(),
        );

        for base in &config.markup_providers {
            service = service.with_source(Arc::new(MarkupProvider::new(client.clone(), base)));
        }
        if let Some(base) = &config.json_provider {
            service = service.with_source(Arc::new(JsonProvider::new(client.clone(), base)));
        }

        info!(
            markup_providers = config.markup_providers.len(),
            json_provider = config.json_provider.is_some(),
            search_fallback = config.resolver.search_api.is_some(),
            "Danmu service configured"
        );
        service
    }

    /// Append a provider tier after the ones already registered.
    pub fn with_source(mut self, source: Arc<dyn CommentSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Registered tiers, not counting the per-request custom tier.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// The chain for one request: the custom tier (when configured) first,
    /// then the registered tiers.
    pub async fn build_chain(&self) -> ProviderChain {
        let mut chain = ProviderChain::new(self.config.clone());
        if let Some(settings) = self.site_config.custom_provider().await {
            debug!(endpoint = %settings.endpoint, "Custom provider enabled");
            chain.register(Arc::new(CustomProvider::new(
                self.client.clone(),
                settings.endpoint,
                settings.token,
            )));
        }
        for source in &self.sources {
            chain.register(source.clone());
        }
        chain
    }

    /// Run the whole pipeline for `query`.
    pub async fn aggregate(&self, query: &MediaQuery) -> Result<AggregateResponse> {
        if !query.has_identity() {
            return Err(Error::validation("mediaId or title is required"));
        }
        let started = Instant::now();

        info!(
            stage = %PipelineStage::Resolving,
            media_id = ?query.media_id(),
            title = ?query.title(),
            episode = ?query.episode(),
            "Aggregating danmu"
        );
        let links = self.resolver.resolve(query).await;
        if links.is_empty() {
            info!(stage = %PipelineStage::Done, "No platform links resolved");
            return Ok(AggregateResponse::empty());
        }

        info!(stage = %PipelineStage::Fetching, links = links.len(), "Fetching comments");
        let chain = self.build_chain().await;
        let results = join_all(
            links
                .iter()
                .map(|link| chain.run(&link.platform, &link.url)),
        )
        .await;

        let platforms: Vec<PlatformSummary> = links
            .iter()
            .zip(&results)
            .map(|(link, result)| PlatformSummary {
                platform: link.platform.clone(),
                url: link.url.clone(),
                count: result.count(),
            })
            .collect();

        info!(stage = %PipelineStage::Merging, platforms = platforms.len(), "Merging comments");
        let danmu = merge_platforms(results.into_iter().map(|r| r.comments).collect()).await;
        let total = danmu.len();

        info!(
            stage = %PipelineStage::Done,
            total,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Danmu aggregated"
        );
        Ok(AggregateResponse {
            danmu,
            platforms,
            total,
        })
    }
}
