//! Environment-driven configuration.
//!
//! Values are read once at startup, after `.env` has been loaded. The custom
//! provider settings are the exception: see [`site`].

pub mod site;

use danmaku::{ChainConfig, ReplacementPolicy};
use platforms_resolver::ResolverConfig;

use crate::api::server::ApiServerConfig;
use crate::logging::LogFormat;

pub use site::{CustomProviderSettings, EnvSiteConfig, SiteConfigSource};

/// Everything the binary needs to wire the service together.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ApiServerConfig,
    pub resolver: ResolverConfig,
    pub chain: ChainConfig,
    /// Base URLs of the markup providers, in tier order
    pub markup_providers: Vec<String>,
    pub json_provider: Option<String>,
    pub log_dir: Option<String>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load config from environment variables, falling back to defaults.
    ///
    /// Supported env vars:
    /// - `DANMU_BIND_ADDRESS`, `DANMU_PORT`
    /// - `DANMU_MARKUP_PROVIDERS` (comma-separated base URLs)
    /// - `DANMU_JSON_PROVIDER`, `DANMU_SEARCH_API`
    /// - `DANMU_THRESHOLD`, `DANMU_MAX_TOTAL`, `DANMU_RESERVOIR`
    /// - `LOG_DIR`, `LOG_FORMAT`
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env_or_default`] over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self {
            server: ApiServerConfig::from_lookup(&lookup),
            ..Self::default()
        };

        if let Some(providers) = non_empty(&lookup, "DANMU_MARKUP_PROVIDERS") {
            config.markup_providers = split_list(&providers);
        }
        config.json_provider = non_empty(&lookup, "DANMU_JSON_PROVIDER");

        if let Some(api) = non_empty(&lookup, "DANMU_SEARCH_API") {
            config.resolver = config.resolver.with_search_api(api);
        }

        if let Some(threshold) = lookup("DANMU_THRESHOLD")
            && let Ok(parsed) = threshold.trim().parse::<usize>()
            && parsed > 0
        {
            config.chain.threshold = parsed;
        }

        if let Some(max_total) = lookup("DANMU_MAX_TOTAL")
            && let Ok(parsed) = max_total.trim().parse::<usize>()
            && parsed >= 2
        {
            config.chain.density.max_total = parsed;
        }

        if let Some(reservoir) = lookup("DANMU_RESERVOIR")
            && parse_bool(&reservoir)
        {
            config.chain.density.replacement = ReplacementPolicy::Reservoir;
        }

        config.log_dir = non_empty(&lookup, "LOG_DIR");
        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = LogFormat::parse(&format);
        }

        config
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.server.port, 3300);
        assert!(config.markup_providers.is_empty());
        assert!(config.json_provider.is_none());
        assert!(config.resolver.search_api.is_none());
        assert_eq!(config.chain.threshold, 100);
        assert_eq!(config.chain.density.max_total, 20_000);
        assert_eq!(
            config.chain.density.replacement,
            ReplacementPolicy::Approximate
        );
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DANMU_PORT", "8080"),
            (
                "DANMU_MARKUP_PROVIDERS",
                "https://a.example.com/, ,https://b.example.com",
            ),
            ("DANMU_JSON_PROVIDER", " https://json.example.com/api "),
            ("DANMU_SEARCH_API", "https://search.example.com/api.php/provide/vod"),
            ("DANMU_THRESHOLD", "50"),
            ("DANMU_MAX_TOTAL", "5000"),
            ("DANMU_RESERVOIR", "true"),
            ("LOG_DIR", "./logs"),
            ("LOG_FORMAT", "json"),
        ]));

        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.markup_providers,
            vec!["https://a.example.com", "https://b.example.com"]
        );
        assert_eq!(
            config.json_provider.as_deref(),
            Some("https://json.example.com/api")
        );
        assert!(config.resolver.search_api.is_some());
        assert_eq!(config.chain.threshold, 50);
        assert_eq!(config.chain.density.max_total, 5000);
        assert_eq!(config.chain.density.replacement, ReplacementPolicy::Reservoir);
        assert_eq!(config.log_dir.as_deref(), Some("./logs"));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DANMU_PORT", "not-a-port"),
            ("DANMU_THRESHOLD", "0"),
            ("DANMU_MAX_TOTAL", "-3"),
            ("DANMU_RESERVOIR", "nope"),
        ]));
        assert_eq!(config.server.port, 3300);
        assert_eq!(config.chain.threshold, 100);
        assert_eq!(config.chain.density.max_total, 20_000);
        assert_eq!(
            config.chain.density.replacement,
            ReplacementPolicy::Approximate
        );
    }
}
