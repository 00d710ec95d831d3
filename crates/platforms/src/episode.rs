//! Episode-link selection.
//!
//! When a platform exposes several raw candidate links for one title, the
//! requested episode picks one of them:
//!
//! 1. a candidate whose URL embeds a matching episode parameter wins outright,
//!    then a candidate whose source label names the episode;
//! 2. otherwise candidate order stands in for episode order (`episode - 1`);
//! 3. an episode past the end selects the last candidate;
//! 4. no requested episode selects the first candidate.

use url::Url;

/// Query parameters that carry an episode number on some platform or redirect link.
const EPISODE_PARAMS: &[&str] = &["p", "ep", "episode", "ep_num"];

/// A raw link found for one platform, before selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// URL as it appeared in the source (may be a redirect link)
    pub raw_url: String,
    /// Decoded platform URL the raw link points to
    pub target_url: String,
    /// Label attached to the link by the source, e.g. "第3集"
    pub label: Option<String>,
}

impl Candidate {
    pub fn new(raw_url: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            raw_url: raw_url.into(),
            target_url: target_url.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Episode number embedded as a query parameter of the raw or target URL.
    pub fn embedded_episode(&self) -> Option<u32> {
        embedded_episode(&self.raw_url).or_else(|| embedded_episode(&self.target_url))
    }
}

/// Extract the leading run of ASCII digits from an episode label.
///
/// Accepts bare numbers ("3", "03") and prefixed labels ("第3集", "EP03", "Episode 3").
pub fn parse_episode_number(label: &str) -> Option<u32> {
    let digits: String = label
        .trim()
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn embedded_episode(url: &str) -> Option<u32> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| EPISODE_PARAMS.contains(&key.as_ref()))
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// Pick one candidate for the requested episode.
///
/// `requested` is the raw episode string from the request; anything that does
/// not contain a number behaves as if no episode was requested.
pub fn select_episode<'a>(candidates: &'a [Candidate], requested: Option<&str>) -> Option<&'a Candidate> {
    let first = candidates.first()?;
    let Some(episode) = requested.and_then(parse_episode_number) else {
        return Some(first);
    };

    if let Some(exact) = candidates
        .iter()
        .find(|c| c.embedded_episode() == Some(episode))
    {
        return Some(exact);
    }

    if let Some(labelled) = candidates
        .iter()
        .find(|c| c.label.as_deref().is_some_and(|l| label_matches(l, episode)))
    {
        return Some(labelled);
    }

    let index = (episode.max(1) - 1) as usize;
    candidates.get(index).or_else(|| candidates.last())
}

/// True when a playlist label names the requested episode.
pub fn label_matches(label: &str, episode: u32) -> bool {
    parse_episode_number(label) == Some(episode)
}
