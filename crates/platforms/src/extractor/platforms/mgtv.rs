use std::sync::LazyLock;

use regex::Regex;

use crate::extractor::{platform_extractor::PlatformLinkExtractor, utils::normalize_watch_url};

pub static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://(?:www\.|m\.)?mgtv\.com/[^\s"'<>\\]+"#).unwrap());

/// Mango TV (芒果TV).
pub struct Mgtv;

impl Mgtv {
    const HOST_REWRITES: &[(&str, &str)] =
        &[("m.mgtv.com", "www.mgtv.com"), ("mgtv.com", "www.mgtv.com")];
}

impl PlatformLinkExtractor for Mgtv {
    fn platform(&self) -> &'static str {
        "mgtv"
    }

    fn display_name(&self) -> &'static str {
        "芒果TV"
    }

    fn url_regex(&self) -> &'static Regex {
        &URL_REGEX
    }

    fn normalize(&self, url: &str) -> Option<String> {
        normalize_watch_url(url, Self::HOST_REWRITES, &[])
    }
}
