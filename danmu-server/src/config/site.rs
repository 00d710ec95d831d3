//! Site configuration collaborator.
//!
//! Supplies the optional user-configured comment provider. Looked up on every
//! request so an operator can change it without restarting the server.

use async_trait::async_trait;

/// Endpoint and token of the user-configured comment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomProviderSettings {
    pub endpoint: String,
    pub token: String,
}

/// Read-only access to site configuration.
#[async_trait]
pub trait SiteConfigSource: Send + Sync {
    /// `None` when no custom provider is configured.
    async fn custom_provider(&self) -> Option<CustomProviderSettings>;
}

/// Reads `DANMU_CUSTOM_ENDPOINT` and `DANMU_CUSTOM_TOKEN` from the process
/// environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSiteConfig;

impl EnvSiteConfig {
    pub const ENDPOINT_VAR: &'static str = "DANMU_CUSTOM_ENDPOINT";
    pub const TOKEN_VAR: &'static str = "DANMU_CUSTOM_TOKEN";

    /// Settings from an arbitrary key lookup; both values must be non-blank.
    pub fn settings_from(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<CustomProviderSettings> {
        let endpoint = lookup(Self::ENDPOINT_VAR)?.trim().trim_end_matches('/').to_string();
        let token = lookup(Self::TOKEN_VAR)?.trim().to_string();
        if endpoint.is_empty() || token.is_empty() {
            return None;
        }
        Some(CustomProviderSettings { endpoint, token })
    }
}

#[async_trait]
impl SiteConfigSource for EnvSiteConfig {
    async fn custom_provider(&self) -> Option<CustomProviderSettings> {
        Self::settings_from(|key| std::env::var(key).ok())
    }
}

/// Fixed settings, mostly for tests.
#[async_trait]
impl SiteConfigSource for Option<CustomProviderSettings> {
    async fn custom_provider(&self) -> Option<CustomProviderSettings> {
        self.clone()
    }
}
