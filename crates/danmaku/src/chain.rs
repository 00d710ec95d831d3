//! Tiered provider chain.
//!
//! Sources are tried in order for one platform link. The first source whose
//! result reaches the threshold wins outright; otherwise the latest non-empty
//! result is carried along and returned once every source has been tried. A
//! failing or timed-out source counts as an empty one.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::message::{CommentEntry, ProviderResult, ProviderTier};
use crate::provider::CommentSource;
use crate::sampler::{DensityConfig, bound_density};

/// Entries a tier must return to end the chain early.
pub const MIN_THRESHOLD: usize = 100;

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub threshold: usize,
    pub default_timeout: Duration,
    /// Timeout for platforms whose origins answer slowly
    pub slow_timeout: Duration,
    pub slow_platforms: Vec<String>,
    pub density: DensityConfig,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            threshold: MIN_THRESHOLD,
            default_timeout: Duration::from_secs(15),
            slow_timeout: Duration::from_secs(30),
            slow_platforms: vec!["iqiyi".into(), "youku".into(), "mgtv".into()],
            density: DensityConfig::default(),
        }
    }
}

impl ChainConfig {
    /// Per-call timeout for `platform`.
    pub fn timeout_for(&self, platform: &str) -> Duration {
        if self
            .slow_platforms
            .iter()
            .any(|p| p.eq_ignore_ascii_case(platform))
        {
            self.slow_timeout
        } else {
            self.default_timeout
        }
    }
}

/// Best result seen so far while walking the chain.
#[derive(Debug, Default)]
pub struct Best {
    pub tier: ProviderTier,
    pub entries: Vec<CommentEntry>,
}

/// One fold step: stop on a result at or above `threshold`, otherwise keep the
/// newer result if it is non-empty.
pub fn fold_step(
    best: Best,
    tier: ProviderTier,
    entries: Vec<CommentEntry>,
    threshold: usize,
) -> ControlFlow<Best, Best> {
    if entries.len() >= threshold {
        return ControlFlow::Break(Best { tier, entries });
    }
    if entries.is_empty() {
        ControlFlow::Continue(best)
    } else {
        ControlFlow::Continue(Best { tier, entries })
    }
}

/// Ordered comment sources for one platform link.
#[derive(Default)]
pub struct ProviderChain {
    sources: Vec<Arc<dyn CommentSource>>,
    config: ChainConfig,
}

impl ProviderChain {
    /// Create an empty chain.
    pub fn new(config: ChainConfig) -> Self {
        Self {
            sources: Vec::new(),
            config,
        }
    }

    /// Append a source; sources run in registration order.
    pub fn register(&mut self, source: Arc<dyn CommentSource>) {
        self.sources.push(source);
    }

    pub fn with_source(mut self, source: Arc<dyn CommentSource>) -> Self {
        self.register(source);
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Walk the sources for one link without density control.
    pub async fn collect(&self, platform: &str, video_url: &str) -> Best {
        let timeout = self.config.timeout_for(platform);
        let mut best = Best::default();
        let mut markup_found = false;

        for source in &self.sources {
            let tier = source.tier();
            if tier == ProviderTier::Json && markup_found {
                debug!(platform = %platform, provider = %source.name(), "Markup tier had results; skipping JSON tier");
                continue;
            }

            let entries = match tokio::time::timeout(timeout, source.fetch(platform, video_url)).await {
                Ok(Ok(entries)) => entries,
                Ok(Err(e)) => {
                    warn!(platform = %platform, provider = %source.name(), tier = ?tier, error = %e, "Provider failed");
                    Vec::new()
                }
                Err(_) => {
                    warn!(platform = %platform, provider = %source.name(), tier = ?tier, timeout_secs = timeout.as_secs(), "Provider timed out");
                    Vec::new()
                }
            };

            if tier == ProviderTier::Markup && !entries.is_empty() {
                markup_found = true;
            }
            debug!(platform = %platform, provider = %source.name(), tier = ?tier, count = entries.len(), "Provider tier finished");

            best = match fold_step(best, tier, entries, self.config.threshold) {
                ControlFlow::Break(done) => {
                    info!(platform = %platform, provider = %source.name(), count = done.entries.len(), "Provider met threshold");
                    return done;
                }
                ControlFlow::Continue(best) => best,
            };
        }
        best
    }

    /// Collect and density-bound the comments of one link.
    pub async fn run(&self, platform: &str, video_url: &str) -> ProviderResult {
        let best = self.collect(platform, video_url).await;
        let comments = bound_density(best.entries, &self.config.density).await;
        info!(platform = %platform, tier = ?best.tier, count = comments.len(), "Platform comments ready");
        ProviderResult {
            platform: platform.to_string(),
            comments,
            provider_tier: best.tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DanmakuError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockSource {
        name: &'static str,
        tier: ProviderTier,
        count: usize,
        delay: Duration,
        fail: bool,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn new(name: &'static str, tier: ProviderTier, count: usize) -> Self {
            Self {
                name,
                tier,
                count,
                delay: Duration::ZERO,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CommentSource for MockSource {
        fn name(&self) -> &str {
            self.name
        }

        fn tier(&self) -> ProviderTier {
            self.tier
        }

        async fn fetch(&self, _platform: &str, _video_url: &str) -> Result<Vec<CommentEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(DanmakuError::other("boom"));
            }
            Ok((0..self.count)
                .map(|i| CommentEntry::new(format!("{}的第{i}条", self.name), i as f64))
                .collect())
        }
    }

    fn chain(sources: &[Arc<MockSource>]) -> ProviderChain {
        sources.iter().fold(ProviderChain::new(ChainConfig::default()), |chain, s| {
            chain.with_source(s.clone())
        })
    }

    #[tokio::test]
    async fn test_threshold_stops_chain() {
        let custom = Arc::new(MockSource::new("custom", ProviderTier::Custom, 150));
        let markup = Arc::new(MockSource::new("markup", ProviderTier::Markup, 500));
        let json = Arc::new(MockSource::new("json", ProviderTier::Json, 500));

        let result = chain(&[custom.clone(), markup.clone(), json.clone()])
            .run("tencent", "https://v.qq.com/x.html")
            .await;

        assert_eq!(result.count(), 150);
        assert_eq!(result.provider_tier, ProviderTier::Custom);
        assert_eq!(custom.calls(), 1);
        assert_eq!(markup.calls(), 0);
        assert_eq!(json.calls(), 0);
    }

    #[tokio::test]
    async fn test_below_threshold_falls_through_to_second_markup_tier() {
        let custom = Arc::new(MockSource::new("custom", ProviderTier::Custom, 40));
        let first = Arc::new(MockSource::new("first", ProviderTier::Markup, 0));
        let second = Arc::new(MockSource::new("second", ProviderTier::Markup, 30));
        let json = Arc::new(MockSource::new("json", ProviderTier::Json, 80));

        let result = chain(&[custom.clone(), first.clone(), second.clone(), json.clone()])
            .run("tencent", "https://v.qq.com/x.html")
            .await;

        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
        // a markup tier produced something, so the JSON tier is skipped
        assert_eq!(json.calls(), 0);
        assert_eq!(result.count(), 30);
        assert!(result.comments.iter().all(|c| c.text.starts_with("second")));
        assert_eq!(result.provider_tier, ProviderTier::Markup);
    }

    #[tokio::test]
    async fn test_json_tier_when_markup_empty() {
        let first = Arc::new(MockSource::new("first", ProviderTier::Markup, 0));
        let broken = Arc::new(MockSource::new("broken", ProviderTier::Markup, 300).failing());
        let json = Arc::new(MockSource::new("json", ProviderTier::Json, 60));

        let result = chain(&[first.clone(), broken.clone(), json.clone()])
            .run("youku", "https://v.youku.com/v_show/id_X.html")
            .await;

        assert_eq!(broken.calls(), 1);
        assert_eq!(json.calls(), 1);
        assert_eq!(result.count(), 60);
        assert_eq!(result.provider_tier, ProviderTier::Json);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_empty() {
        let custom = Arc::new(MockSource::new("custom", ProviderTier::Custom, 20));
        let hanging = Arc::new(
            MockSource::new("hanging", ProviderTier::Markup, 500).delayed(Duration::from_secs(60)),
        );

        let result = chain(&[custom.clone(), hanging.clone()])
            .run("tencent", "https://v.qq.com/x.html")
            .await;

        assert_eq!(hanging.calls(), 1);
        assert_eq!(result.count(), 20);
        assert_eq!(result.provider_tier, ProviderTier::Custom);
    }

    #[tokio::test]
    async fn test_all_empty() {
        let result = chain(&[Arc::new(MockSource::new("a", ProviderTier::Markup, 0))])
            .run("mgtv", "https://www.mgtv.com/b/1/2.html")
            .await;
        assert_eq!(result.count(), 0);
        assert_eq!(result.provider_tier, ProviderTier::None);

        let result = ProviderChain::default().run("mgtv", "x").await;
        assert_eq!(result.count(), 0);
    }

    #[test]
    fn test_timeouts_by_platform() {
        let config = ChainConfig::default();
        assert_eq!(config.timeout_for("iqiyi"), Duration::from_secs(30));
        assert_eq!(config.timeout_for("MGTV"), Duration::from_secs(30));
        assert_eq!(config.timeout_for("tencent"), Duration::from_secs(15));
        assert_eq!(config.timeout_for("bilibili"), Duration::from_secs(15));
    }
}
