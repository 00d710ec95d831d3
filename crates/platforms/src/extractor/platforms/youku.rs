use std::sync::LazyLock;

use regex::Regex;

use crate::extractor::{
    platform_extractor::PlatformLinkExtractor,
    utils::{capture_group_1, normalize_watch_url, unescape_embedded_url},
};

pub static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://(?:v|m)\.youku\.com/[^\s"'<>\\]+"#).unwrap());

static VIDEO_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/id_([A-Za-z0-9=_-]+?)(?:\.html|$|\?)").unwrap());

/// Youku (优酷).
pub struct Youku;

impl PlatformLinkExtractor for Youku {
    fn platform(&self) -> &'static str {
        "youku"
    }

    fn display_name(&self) -> &'static str {
        "优酷视频"
    }

    fn url_regex(&self) -> &'static Regex {
        &URL_REGEX
    }

    fn normalize(&self, url: &str) -> Option<String> {
        let url = unescape_embedded_url(url);
        // Mobile pages (`/alipay_video/id_..`, `/video/id_..`) share the video id
        // with the desktop `/v_show/id_..` page.
        if let Some(id) = capture_group_1(&VIDEO_ID_REGEX, &url) {
            return Some(format!("https://v.youku.com/v_show/id_{id}.html"));
        }
        normalize_watch_url(&url, &[("m.youku.com", "v.youku.com")], &[])
    }
}
