//! Comment source trait.
//!
//! Defines the interface every comment provider tier implements.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::{CommentEntry, ProviderTier};

/// A source of comments for a platform watch URL.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Name used in logs, usually the host of the provider.
    fn name(&self) -> &str;

    /// Tier this source belongs to.
    fn tier(&self) -> ProviderTier;

    /// Fetch the comments of `video_url`, already parsed and filtered.
    async fn fetch(&self, platform: &str, video_url: &str) -> Result<Vec<CommentEntry>>;
}
