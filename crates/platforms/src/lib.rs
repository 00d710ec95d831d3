//! Platform URL resolution for danmu aggregation.
//!
//! Given a media identifier and/or a title, this crate produces the watch-page
//! URL of that title (and episode) on each supported streaming platform.
//!
//! ## Core Types
//!
//! - [`MediaQuery`] - What to resolve (media id, title, year, episode)
//! - [`PlatformLink`] - One resolved watch-page URL on one platform
//! - [`LinkResolver`] - Trait for anything that turns a query into links
//! - [`PlatformResolver`] - Aggregator-page scrape with a title-search fallback
//!
//! ## Extraction
//!
//! - [`extractor::PlatformLinkExtractor`] - Per-platform link recognition and normalization
//! - [`extractor::ExtractorRegistry`] - The five supported platforms
//!
//! ## Fetching
//!
//! - [`RateLimitedFetcher`] - Serialized, jittered calls to a scrape-sensitive origin

pub mod client;
pub mod episode;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod link;
pub mod resolver;

pub use client::{DEFAULT_UA, create_client, create_client_builder};
pub use episode::{Candidate, parse_episode_number, select_episode};
pub use error::{ResolverError, Result};
pub use fetcher::{JitterRange, RateLimitedFetcher};
pub use link::{MediaQuery, PlatformLink};
pub use resolver::{LinkResolver, PlatformResolver, ResolverConfig};
