//! Markup payload parser.
//!
//! Markup providers return a plain-text document of `<d p="time,mode,color,...">text</d>`
//! fragments. Fragments are matched one at a time, so a malformed or truncated
//! fragment costs only itself.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{CaptureMatches, Regex};

use crate::message::{CommentEntry, DEFAULT_COLOR, DanmuMode, format_color};

static FRAGMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<d\s+p\s*=\s*"([^"]*)"[^>]*>([^<]*)</d>"#).unwrap());

/// One `<d>` fragment, still packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFragment<'a> {
    /// The packed `p` attribute
    pub attrs: &'a str,
    /// Escaped text body
    pub body: &'a str,
}

/// Iterator over the complete fragments of a payload, in document order.
pub struct MarkupFragments<'a> {
    inner: CaptureMatches<'static, 'a>,
}

impl<'a> MarkupFragments<'a> {
    pub fn new(payload: &'a str) -> Self {
        Self {
            inner: FRAGMENT_REGEX.captures_iter(payload),
        }
    }
}

impl<'a> Iterator for MarkupFragments<'a> {
    type Item = RawFragment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = self.inner.next()?;
        Some(RawFragment {
            attrs: caps.get(1).map_or("", |m| m.as_str()),
            body: caps.get(2).map_or("", |m| m.as_str()),
        })
    }
}

/// Undo XML escaping; text with a broken entity is kept as-is.
pub fn unescape_text(body: &str) -> Cow<'_, str> {
    quick_xml::escape::unescape(body).unwrap_or(Cow::Borrowed(body))
}

/// Build an entry from a packed `time,mode,color[,...]` attribute and its text.
///
/// Only an unreadable time rejects the fragment; mode and color fall back to
/// scroll and white.
pub fn entry_from_attributes(attrs: &str, text: &str) -> Option<CommentEntry> {
    let mut parts = attrs.split(',').map(str::trim);
    let time: f64 = parts.next()?.parse().ok()?;
    let mode = parts
        .next()
        .and_then(|m| m.parse::<i64>().ok())
        .map(DanmuMode::from_source_code)
        .unwrap_or_default();
    let color = parts
        .next()
        .and_then(|c| c.parse::<i64>().ok())
        .map(format_color)
        .unwrap_or_else(|| DEFAULT_COLOR.to_string());

    Some(CommentEntry {
        text: text.to_string(),
        time_seconds: time,
        color,
        mode,
    })
}

/// Parse one raw fragment.
pub fn parse_fragment(fragment: &RawFragment<'_>) -> Option<CommentEntry> {
    entry_from_attributes(fragment.attrs, &unescape_text(fragment.body))
}

/// Every well-formed fragment of `payload`, unfiltered.
pub fn parse_markup(payload: &str) -> Vec<CommentEntry> {
    MarkupFragments::new(payload)
        .filter_map(|fragment| parse_fragment(&fragment))
        .collect()
}
