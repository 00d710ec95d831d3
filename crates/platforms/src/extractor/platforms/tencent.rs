use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::extractor::{
    platform_extractor::PlatformLinkExtractor,
    utils::{normalize_watch_url, unescape_embedded_url},
};

pub static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://(?:m\.)?v\.qq\.com/[^\s"'<>\\]+"#).unwrap());

/// Tencent Video (腾讯视频).
pub struct Tencent;

impl Tencent {
    const HOST_REWRITES: &[(&str, &str)] = &[("m.v.qq.com", "v.qq.com")];

    /// `/x/m/play?cid=..&vid=..` is the mobile player; rebuild the desktop cover URL.
    fn rewrite_mobile_player(url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        if !parsed.path().starts_with("/x/m/play") {
            return None;
        }
        let param = |name: &str| {
            parsed
                .query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
                .filter(|v| !v.is_empty())
        };
        let cid = param("cid")?;
        Some(match param("vid") {
            Some(vid) => format!("https://v.qq.com/x/cover/{cid}/{vid}.html"),
            None => format!("https://v.qq.com/x/cover/{cid}.html"),
        })
    }
}

impl PlatformLinkExtractor for Tencent {
    fn platform(&self) -> &'static str {
        "tencent"
    }

    fn display_name(&self) -> &'static str {
        "腾讯视频"
    }

    fn url_regex(&self) -> &'static Regex {
        &URL_REGEX
    }

    fn normalize(&self, url: &str) -> Option<String> {
        let url = unescape_embedded_url(url);
        if let Some(rebuilt) = Self::rewrite_mobile_player(&url) {
            return Some(rebuilt);
        }
        normalize_watch_url(&url, Self::HOST_REWRITES, &[])
    }
}
