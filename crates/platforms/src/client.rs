use reqwest::{Client, ClientBuilder};
use std::time::Duration;

pub const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Overall cap for any single request. Call sites set tighter per-request timeouts.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder with the defaults every outbound call in this workspace shares.
///
/// `user_agent` overrides [`DEFAULT_UA`].
pub fn create_client_builder(user_agent: Option<&str>) -> ClientBuilder {
    Client::builder()
        .user_agent(user_agent.unwrap_or(DEFAULT_UA))
        .gzip(true)
        .deflate(true)
        .connect_timeout(Duration::from_secs(10))
        .timeout(CLIENT_TIMEOUT)
}

/// Build the shared client, falling back to reqwest defaults if the builder fails.
pub fn create_client() -> Client {
    match create_client_builder(None).build() {
        Ok(client) => client,
        Err(error) => {
            tracing::warn!(
                error = %error,
                "Failed to create HTTP client; falling back to reqwest defaults"
            );
            Client::new()
        }
    }
}
