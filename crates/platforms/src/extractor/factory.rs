use super::platform_extractor::PlatformLinkExtractor;
use crate::extractor::platforms::{
    bilibili::Bilibili, iqiyi::Iqiyi, mgtv::Mgtv, tencent::Tencent, youku::Youku,
};

macro_rules! platform_registry {
    ( $( $extractor:expr ),+ $(,)? ) => {
        &[ $( &$extractor as &'static dyn PlatformLinkExtractor ),+ ]
    };
}

// Static platform registry, in aggregator-page display order.
static PLATFORMS: &[&'static dyn PlatformLinkExtractor] =
    platform_registry![Tencent, Iqiyi, Youku, Mgtv, Bilibili];

/// Registry of the platforms links can be resolved for.
#[derive(Clone)]
pub struct ExtractorRegistry {
    extractors: Vec<&'static dyn PlatformLinkExtractor>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ExtractorRegistry {
    /// Registry holding all supported platforms.
    pub fn with_defaults() -> Self {
        Self {
            extractors: PLATFORMS.to_vec(),
        }
    }

    /// Extractor whose pattern matches `url`.
    pub fn find_by_url(&self, url: &str) -> Option<&'static dyn PlatformLinkExtractor> {
        self.extractors.iter().copied().find(|e| e.matches(url))
    }

    pub fn get_by_platform(&self, platform: &str) -> Option<&'static dyn PlatformLinkExtractor> {
        self.extractors
            .iter()
            .copied()
            .find(|e| e.platform().eq_ignore_ascii_case(platform))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static dyn PlatformLinkExtractor> + '_ {
        self.extractors.iter().copied()
    }

    pub fn platforms(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.platform()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_with_defaults() {
        let registry = ExtractorRegistry::with_defaults();
        assert_eq!(
            registry.platforms(),
            vec!["tencent", "iqiyi", "youku", "mgtv", "bilibili"]
        );
    }

    #[test]
    fn test_find_by_url() {
        let registry = ExtractorRegistry::with_defaults();
        let cases = [
            ("https://v.qq.com/x/cover/mzc00200abc/x0041.html", "tencent"),
            ("https://m.iqiyi.com/v_19rrok4nt0.html", "iqiyi"),
            ("https://v.youku.com/v_show/id_XNTk2.html", "youku"),
            ("https://www.mgtv.com/b/338497/7409846.html", "mgtv"),
            ("https://www.bilibili.com/bangumi/play/ep1234", "bilibili"),
        ];
        for (url, platform) in cases {
            let extractor = registry.find_by_url(url).unwrap();
            assert_eq!(extractor.platform(), platform, "{url}");
        }
        assert!(registry.find_by_url("https://www.example.com/video/1").is_none());
    }

    #[test]
    fn test_get_by_platform() {
        let registry = ExtractorRegistry::with_defaults();
        assert_eq!(registry.get_by_platform("MGTV").unwrap().display_name(), "芒果TV");
        assert!(registry.get_by_platform("huya").is_none());
    }
}
