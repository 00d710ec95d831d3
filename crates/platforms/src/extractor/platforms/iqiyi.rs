use std::sync::LazyLock;

use regex::Regex;

use crate::extractor::{platform_extractor::PlatformLinkExtractor, utils::normalize_watch_url};

pub static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://(?:www\.|m\.)?iqiyi\.com/[^\s"'<>\\]+"#).unwrap()
});

/// iQIYI (爱奇艺).
pub struct Iqiyi;

impl Iqiyi {
    const HOST_REWRITES: &[(&str, &str)] =
        &[("m.iqiyi.com", "www.iqiyi.com"), ("iqiyi.com", "www.iqiyi.com")];
}

impl PlatformLinkExtractor for Iqiyi {
    fn platform(&self) -> &'static str {
        "iqiyi"
    }

    fn display_name(&self) -> &'static str {
        "爱奇艺"
    }

    fn url_regex(&self) -> &'static Regex {
        &URL_REGEX
    }

    fn normalize(&self, url: &str) -> Option<String> {
        normalize_watch_url(url, Self::HOST_REWRITES, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(
            Iqiyi
                .normalize("http://m.iqiyi.com/v_19rrok4nt0.html?vfm=m_331_dbdy&fv=4904d94982104144a1548dd9040df241")
                .as_deref(),
            Some("https://www.iqiyi.com/v_19rrok4nt0.html")
        );
    }
}
