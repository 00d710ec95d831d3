use std::sync::Arc;

use anyhow::Context;
use danmu_server::api::{ApiServer, AppState};
use danmu_server::config::AppConfig;
use danmu_server::danmu::DanmuService;
use danmu_server::logging::init_logging;
use platforms_resolver::create_client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env_or_default();
    let _guard = init_logging(config.log_dir.as_deref(), config.log_format)
        .context("failed to initialize logging")?;

    let service = DanmuService::from_config(&config, create_client());
    let server = ApiServer::new(config.server.clone(), AppState::new(Arc::new(service)));

    let cancel_token = server.cancel_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel_token.cancel();
    });

    server.run().await.context("API server failed")?;

    tracing::info!("danmu-server stopped");
    Ok(())
}
