//! Link extraction from an aggregator detail page.
//!
//! Detail pages list their play sources in two shapes: an inline script of
//! `{play_link: "...", ep: "N"}` entries and plain redirect anchors
//! (`/link2/?url=<encoded target>`). Some pages also carry direct platform
//! links. All three are collected, decoded and grouped per platform.

use rustc_hash::FxHashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::episode::{Candidate, parse_episode_number, select_episode};
use crate::extractor::{
    ExtractorRegistry, PlatformLinkExtractor, utils::unescape_embedded_url,
};
use crate::link::PlatformLink;

static SOURCE_ENTRY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"play_link\s*:\s*"([^"]+)"\s*,\s*ep\s*:\s*"([^"]*)""#).unwrap()
});

static REDIRECT_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:https?:)?//www\.douban\.com/link2/\?[^"'\s<>]+"#).unwrap()
});

/// Candidates found on a page for one platform, in page order.
pub struct PlatformCandidates {
    pub extractor: &'static dyn PlatformLinkExtractor,
    pub candidates: Vec<Candidate>,
}

/// Decode the target of a redirect link; `None` if `raw` is not a redirect link.
pub fn redirect_target(raw: &str) -> Option<String> {
    let absolute = if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        raw.to_string()
    };
    let parsed = Url::parse(&absolute).ok()?;
    if !parsed.path().starts_with("/link2") {
        return None;
    }
    let target = parsed
        .query_pairs()
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())?;

    // Some pages double-encode the target.
    if target.starts_with("http%3A") || target.starts_with("https%3A") {
        return urlencoding::decode(&target).ok().map(|t| t.into_owned());
    }
    Some(target)
}

/// Collect every recognizable platform link on `html`, grouped per platform in
/// registry order.
pub fn extract_candidates(html: &str, registry: &ExtractorRegistry) -> Vec<PlatformCandidates> {
    let mut seen = FxHashSet::default();
    let mut found: Vec<(&'static dyn PlatformLinkExtractor, Candidate)> = Vec::new();

    let mut push = |raw: String, label: Option<&str>| {
        let target = redirect_target(&raw).unwrap_or_else(|| raw.clone());
        let Some(extractor) = registry.find_by_url(&target) else {
            return;
        };
        if !seen.insert(target.clone()) {
            return;
        }
        let mut candidate = Candidate::new(raw, target);
        if let Some(label) = label.filter(|l| !l.trim().is_empty()) {
            candidate = candidate.with_label(label.trim());
        }
        found.push((extractor, candidate));
    };

    for caps in SOURCE_ENTRY_REGEX.captures_iter(html) {
        let raw = unescape_embedded_url(&caps[1]);
        push(raw, caps.get(2).map(|m| m.as_str()));
    }
    for m in REDIRECT_LINK_REGEX.find_iter(html) {
        push(unescape_embedded_url(m.as_str()), None);
    }
    for extractor in registry.iter() {
        for link in extractor.find_links(html) {
            push(unescape_embedded_url(link), None);
        }
    }

    registry
        .iter()
        .filter_map(|extractor| {
            let candidates: Vec<Candidate> = found
                .iter()
                .filter(|(e, _)| e.platform() == extractor.platform())
                .map(|(_, c)| c.clone())
                .collect();
            (!candidates.is_empty()).then_some(PlatformCandidates {
                extractor,
                candidates,
            })
        })
        .collect()
}

/// Pick one link per platform for the requested episode.
pub fn select_links(groups: &[PlatformCandidates], episode: Option<&str>) -> Vec<PlatformLink> {
    let episode_number = episode.and_then(parse_episode_number);

    groups
        .iter()
        .filter_map(|group| {
            let chosen = select_episode(&group.candidates, episode)?;
            let url = group.extractor.normalize(&chosen.target_url)?;
            let code = chosen
                .label
                .clone()
                .or_else(|| chosen.embedded_episode().map(|n| n.to_string()));
            Some(
                PlatformLink::new(group.extractor.platform(), url)
                    .with_episode(code, episode_number),
            )
        })
        .collect()
}
