//! Danmaku: time-coded video comment (danmu) aggregation library.
//!
//! This crate fetches comments for a platform watch URL from tiered
//! providers, cleans them, bounds their density and merges several
//! platforms into one chronological feed.
//!
//! ## Core Types
//!
//! - [`CommentEntry`] - A single comment with time, color and mode
//! - [`ProviderResult`] - What one platform link produced
//! - [`CommentSource`] - Trait for a comment provider tier
//!
//! ## Providers
//!
//! - [`providers::CustomProvider`] - User-configured endpoint
//! - [`providers::MarkupProvider`] - Third-party markup provider
//! - [`providers::JsonProvider`] - Third-party JSON provider
//! - [`ProviderChain`] - Threshold-gated, ordered fallback over sources
//!
//! ## Processing
//!
//! - [`ContentFilter`] - Drops low-quality comments
//! - [`parse_markup`] - Parses `<d>` markup payloads
//! - [`DensityController`] / [`sample_to_cap`] - Bound comment volume
//! - [`merge_platforms`] - Time-sorted, deduplicated merge
//!
//! ## Output
//!
//! - [`to_xml`] - XML export of a merged feed

pub mod chain;
pub mod error;
pub mod filter;
pub mod merger;
pub mod message;
pub mod parser;
pub mod provider;
pub mod providers;
pub mod sampler;
pub mod writer;

pub use chain::{ChainConfig, MIN_THRESHOLD, ProviderChain};
pub use error::{DanmakuError, Result};
pub use filter::ContentFilter;
pub use merger::{dedup_key, merge_and_dedup, merge_platforms};
pub use message::{
    CommentEntry, DEFAULT_COLOR, DanmuMode, ProviderResult, ProviderTier, format_color,
    parse_color,
};
pub use parser::{MarkupFragments, parse_markup};
pub use provider::CommentSource;
pub use providers::{CustomProvider, JsonProvider, MarkupProvider};
pub use sampler::{
    DensityConfig, DensityController, ReplacementPolicy, bound_density, sample_to_cap,
};
pub use writer::{escape_xml, to_xml};
