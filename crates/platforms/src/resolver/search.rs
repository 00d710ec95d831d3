//! Title-search fallback.
//!
//! The search service speaks the common `?ac=videolist` video-list API: a
//! keyword search returns `{ list: [...] }` items, and a detail lookup by id
//! returns the same shape with the playlist filled in. Playlists are packed
//! strings: `$$$` separates sources, `#` separates episodes and each episode
//! is `label$url`.

use reqwest::Client;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::episode::{label_matches, parse_episode_number};
use crate::error::{ResolverError, Result};
use crate::extractor::ExtractorRegistry;
use crate::link::PlatformLink;

/// Markers of content that is about a title rather than the title itself.
const DENYLIST: &[&str] = &[
    "预告",
    "花絮",
    "特辑",
    "幕后",
    "片段",
    "解说",
    "trailer",
    "behind the scenes",
];

/// One item of a search or detail response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
    /// Numeric or string id, depending on the service
    #[serde(default)]
    pub vod_id: Value,
    #[serde(default)]
    pub vod_name: String,
    #[serde(default)]
    pub vod_year: Value,
    #[serde(default)]
    pub vod_play_from: String,
    #[serde(default)]
    pub vod_play_url: String,
}

impl SearchItem {
    pub fn id(&self) -> Option<String> {
        value_to_string(&self.vod_id)
    }

    pub fn year(&self) -> Option<String> {
        value_to_string(&self.vod_year)
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
struct ListResponse {
    #[serde(default)]
    list: Vec<SearchItem>,
}

/// One `label$url` entry of a packed playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub label: String,
    pub url: String,
}

/// Lowercase and strip everything that is not a letter or digit.
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn fold_full_width(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '\u{3000}' => ' ',
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            '、' => ',',
            '。' => '.',
            '《' | '》' | '「' | '」' | '【' | '】' => ' ',
            _ => c,
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Search keywords to try for `title`, most specific first.
pub fn title_variants(title: &str) -> Vec<String> {
    let original = title.trim();
    let folded = fold_full_width(original);
    let bare: String = original.chars().filter(|c| c.is_alphanumeric()).collect();
    let main = folded
        .split(':')
        .next()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let mut seen = FxHashSet::default();
    [original.to_string(), folded, bare, main]
        .into_iter()
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

fn is_denylisted(name: &str) -> bool {
    let lower = name.to_lowercase();
    DENYLIST.iter().any(|marker| lower.contains(marker))
}

/// Pick the best search result for `title`.
///
/// An exact normalized-title match wins (one with a matching year first when
/// `year` is given); otherwise the first result that is not a trailer or
/// similar side content.
pub fn rank_candidates<'a>(
    items: &'a [SearchItem],
    title: &str,
    year: Option<&str>,
) -> Option<&'a SearchItem> {
    let wanted = normalize_title(title);
    let exact: Vec<&SearchItem> = items
        .iter()
        .filter(|item| !wanted.is_empty() && normalize_title(&item.vod_name) == wanted)
        .collect();

    if let Some(year) = year.map(str::trim).filter(|y| !y.is_empty())
        && let Some(item) = exact
            .iter()
            .copied()
            .find(|item| item.year().as_deref() == Some(year))
    {
        return Some(item);
    }
    if let Some(item) = exact.first().copied() {
        return Some(item);
    }

    items.iter().find(|item| !is_denylisted(&item.vod_name))
}

/// Split a packed playlist into its sources.
pub fn split_playlist(play_url: &str) -> Vec<Vec<PlaylistEntry>> {
    play_url
        .split("$$$")
        .map(|source| {
            source
                .split('#')
                .filter_map(|episode| {
                    let (label, url) = episode.split_once('$')?;
                    let url = url.trim();
                    if url.is_empty() {
                        return None;
                    }
                    Some(PlaylistEntry {
                        label: label.trim().to_string(),
                        url: url.to_string(),
                    })
                })
                .collect::<Vec<_>>()
        })
        .filter(|source| !source.is_empty())
        .collect()
}

/// One link per platform found in `sources`.
///
/// Within a platform the entry whose label names the requested episode wins,
/// else its first entry. Platforms come out in registry order.
pub fn select_from_playlist(
    sources: &[Vec<PlaylistEntry>],
    episode: Option<&str>,
    registry: &ExtractorRegistry,
) -> Vec<PlatformLink> {
    let episode_number = episode.and_then(parse_episode_number);

    registry
        .iter()
        .filter_map(|extractor| {
            let entries: Vec<&PlaylistEntry> = sources
                .iter()
                .flatten()
                .filter(|entry| extractor.matches(&entry.url))
                .collect();
            let chosen = episode_number
                .and_then(|n| entries.iter().find(|e| label_matches(&e.label, n)))
                .or_else(|| entries.first())?;
            let url = extractor.normalize(&chosen.url)?;
            let code = (!chosen.label.is_empty()).then(|| chosen.label.clone());
            Some(PlatformLink::new(extractor.platform(), url).with_episode(code, episode_number))
        })
        .collect()
}

async fn get_list(client: &Client, api: &str, query: &[(&str, &str)], timeout: Duration) -> Result<Vec<SearchItem>> {
    let response = client
        .get(api)
        .query(query)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| ResolverError::from_request(e, api))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ResolverError::Status {
            status: status.as_u16(),
            url: api.to_string(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| ResolverError::from_request(e, api))?;
    let parsed: ListResponse = serde_json::from_str(&body)?;
    Ok(parsed.list)
}

/// Keyword search.
pub async fn search(client: &Client, api: &str, keyword: &str, timeout: Duration) -> Result<Vec<SearchItem>> {
    let items = get_list(client, api, &[("ac", "videolist"), ("wd", keyword)], timeout).await?;
    debug!(keyword = %keyword, count = items.len(), "Title search finished");
    Ok(items)
}

/// Detail lookup by id; `None` when the service does not know the id.
pub async fn detail(client: &Client, api: &str, id: &str, timeout: Duration) -> Result<Option<SearchItem>> {
    let items = get_list(client, api, &[("ac", "videolist"), ("ids", id)], timeout).await?;
    Ok(items.into_iter().next())
}
