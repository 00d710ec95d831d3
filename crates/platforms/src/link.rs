//! Resolver input and output types.

use serde::{Deserialize, Serialize};

/// What to resolve: an aggregator media id, a title, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaQuery {
    /// Aggregator detail page identifier
    #[serde(default)]
    pub media_id: Option<String>,
    /// Title used by the search fallback
    #[serde(default)]
    pub title: Option<String>,
    /// Release year, used to break ties between equally named candidates
    #[serde(default)]
    pub year: Option<String>,
    /// Requested episode ("3", "第3集", "EP03")
    #[serde(default)]
    pub episode: Option<String>,
}

impl MediaQuery {
    pub fn from_media_id(media_id: impl Into<String>) -> Self {
        Self {
            media_id: Some(media_id.into()),
            ..Default::default()
        }
    }

    pub fn from_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_episode(mut self, episode: impl Into<String>) -> Self {
        self.episode = Some(episode.into());
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn media_id(&self) -> Option<&str> {
        non_blank(self.media_id.as_deref())
    }

    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    pub fn year(&self) -> Option<&str> {
        non_blank(self.year.as_deref())
    }

    pub fn episode(&self) -> Option<&str> {
        non_blank(self.episode.as_deref())
    }

    /// True when there is something to resolve.
    pub fn has_identity(&self) -> bool {
        self.media_id().is_some() || self.title().is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The watch-page URL of one title/episode on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformLink {
    /// Platform id, e.g. "tencent", "bilibili"
    pub platform: String,
    /// Normalized desktop watch-page URL
    pub url: String,
    /// Episode label or embedded episode parameter the link was chosen by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_code: Option<String>,
    /// Requested episode number, when one was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
}

impl PlatformLink {
    pub fn new(platform: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            url: url.into(),
            episode_code: None,
            episode_number: None,
        }
    }

    pub fn with_episode(mut self, code: Option<String>, number: Option<u32>) -> Self {
        self.episode_code = code;
        self.episode_number = number;
        self
    }
}
