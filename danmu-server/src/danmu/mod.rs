//! Danmu aggregation pipeline.
//!
//! One request resolves its platform links, runs the provider chain for every
//! link concurrently, then merges the results into one feed.

pub mod service;

pub use service::{AggregateResponse, DanmuService, PipelineStage, PlatformSummary};
