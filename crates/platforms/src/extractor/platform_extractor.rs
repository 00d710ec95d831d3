use regex::Regex;

/// Recognizes and normalizes watch-page links of one streaming platform.
///
/// Extraction is regex based today; a structural parser can replace an
/// implementation without touching the resolver.
pub trait PlatformLinkExtractor: Send + Sync {
    /// Stable platform id, e.g. "tencent".
    fn platform(&self) -> &'static str;

    /// Human-readable platform name as it appears on aggregator pages.
    fn display_name(&self) -> &'static str;

    /// Pattern matching a watch-page URL of this platform anywhere in a string.
    fn url_regex(&self) -> &'static Regex;

    /// Turn any recognized variant of a watch URL into the canonical desktop URL.
    ///
    /// Returns `None` when `url` is not a usable link of this platform.
    fn normalize(&self, url: &str) -> Option<String>;

    fn matches(&self, url: &str) -> bool {
        self.url_regex().is_match(url)
    }

    /// All raw links of this platform in `text`, in document order.
    fn find_links<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.url_regex()
            .find_iter(text)
            .map(|m| m.as_str())
            .collect()
    }
}
