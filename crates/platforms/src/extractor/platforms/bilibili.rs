use std::sync::LazyLock;

use regex::Regex;

use crate::extractor::{platform_extractor::PlatformLinkExtractor, utils::normalize_watch_url};

pub static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://(?:www\.|m\.)?bilibili\.com/[^\s"'<>\\]+"#).unwrap()
});

/// Bilibili (哔哩哔哩).
pub struct Bilibili;

impl Bilibili {
    const HOST_REWRITES: &[(&str, &str)] = &[
        ("m.bilibili.com", "www.bilibili.com"),
        ("bilibili.com", "www.bilibili.com"),
    ];

    /// `p` selects the part of a multi-part upload, so it survives normalization.
    const KEEP_PARAMS: &[&str] = &["p"];
}

impl PlatformLinkExtractor for Bilibili {
    fn platform(&self) -> &'static str {
        "bilibili"
    }

    fn display_name(&self) -> &'static str {
        "哔哩哔哩"
    }

    fn url_regex(&self) -> &'static Regex {
        &URL_REGEX
    }

    fn normalize(&self, url: &str) -> Option<String> {
        normalize_watch_url(url, Self::HOST_REWRITES, Self::KEEP_PARAMS)
    }
}
