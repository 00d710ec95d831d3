//! Rate-limited fetching for scrape-sensitive origins.
//!
//! Every call to an origin reserves a send slot at least `min_interval` after
//! the previous reservation for that origin, plus a random jitter drawn from
//! the call site's [`JitterRange`]. Reservations are taken under a lock, so
//! concurrent requests queue behind each other instead of firing together.

use parking_lot::Mutex;
use rand::RngExt;
use reqwest::Client;
use rustc_hash::FxHashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use url::Url;

use crate::error::{ResolverError, Result};

/// Default minimum spacing between two calls to the same origin.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Random extra delay window applied by one call site, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl JitterRange {
    /// Desktop detail page.
    pub const DETAIL_PAGE: Self = Self::new(500, 1500);
    /// Mobile detail page, tried right after the desktop page.
    pub const MOBILE_PAGE: Self = Self::new(300, 800);
    /// No jitter.
    pub const NONE: Self = Self::new(0, 0);

    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Draw one delay from the window.
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::rng().random_range(self.min_ms..=self.max_ms))
    }
}

/// HTTP fetcher that spaces out calls per origin.
pub struct RateLimitedFetcher {
    client: Client,
    min_interval: Duration,
    /// origin -> instant the latest reserved call fires at
    slots: Mutex<FxHashMap<String, Instant>>,
}

impl RateLimitedFetcher {
    pub fn new(client: Client) -> Self {
        Self::with_interval(client, DEFAULT_MIN_INTERVAL)
    }

    pub fn with_interval(client: Client, min_interval: Duration) -> Self {
        Self {
            client,
            min_interval,
            slots: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Reserve the next send slot for `origin` and return how long to wait for it.
    pub fn reserve(&self, origin: &str, jitter: Duration) -> Duration {
        let now = Instant::now();
        let mut slots = self.slots.lock();
        let earliest = match slots.get(origin) {
            Some(last) => (*last + self.min_interval).max(now),
            None => now,
        };
        let fire_at = earliest + jitter;
        slots.insert(origin.to_string(), fire_at);
        fire_at.saturating_duration_since(now)
    }

    /// GET `url` as text once this origin's slot comes up.
    pub async fn get_text(
        &self,
        url: &str,
        jitter: JitterRange,
        timeout: Duration,
    ) -> Result<String> {
        let origin = origin_of(url)?;
        let delay = self.reserve(&origin, jitter.sample());
        if !delay.is_zero() {
            debug!(origin = %origin, delay_ms = delay.as_millis() as u64, "Waiting for rate-limit slot");
            tokio::time::sleep(delay).await;
        }

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ResolverError::from_request(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ResolverError::from_request(e, url))
    }
}

fn origin_of(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|_| ResolverError::InvalidUrl(url.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| ResolverError::InvalidUrl(url.to_string()))?;
    Ok(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> RateLimitedFetcher {
        RateLimitedFetcher::new(Client::new())
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_calls_are_spaced() {
        let fetcher = fetcher();
        assert_eq!(fetcher.reserve("movie.douban.com", Duration::ZERO), Duration::ZERO);
        assert_eq!(
            fetcher.reserve("movie.douban.com", Duration::ZERO),
            Duration::from_secs(1)
        );
        assert_eq!(
            fetcher.reserve("movie.douban.com", Duration::ZERO),
            Duration::from_secs(2)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_origins_are_independent() {
        let fetcher = fetcher();
        fetcher.reserve("movie.douban.com", Duration::ZERO);
        assert_eq!(fetcher.reserve("m.douban.com", Duration::ZERO), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_jitter_extends_spacing() {
        let fetcher = fetcher();
        let jitter = Duration::from_millis(700);
        assert_eq!(fetcher.reserve("a.example", jitter), jitter);
        // next slot is measured from when the jittered call fires
        assert_eq!(
            fetcher.reserve("a.example", Duration::ZERO),
            Duration::from_millis(1700)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_origin_has_no_wait() {
        let fetcher = fetcher();
        fetcher.reserve("a.example", Duration::ZERO);
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(fetcher.reserve("a.example", Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_jitter_sample_within_window() {
        let range = JitterRange::new(300, 1500);
        for _ in 0..100 {
            let d = range.sample();
            assert!(d >= Duration::from_millis(300) && d <= Duration::from_millis(1500));
        }
        assert_eq!(JitterRange::NONE.sample(), Duration::ZERO);
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(
            origin_of("https://movie.douban.com/subject/1/").unwrap(),
            "movie.douban.com"
        );
        assert_eq!(origin_of("http://127.0.0.1:8080/x").unwrap(), "127.0.0.1:8080");
        assert!(origin_of("not a url").is_err());
    }
}
