use crate::api::ApiServer;
use crate::config::Config;
use crate::studio::Studio;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub async fn run_service() -> Result<()> {
    info!("Starting phonautograph service");

    let config = Config::load()?;
    let studio = Arc::new(Studio::new(&config)?);
    let api_server = ApiServer::new(studio, &config);

    info!("Phonautograph is ready!");
    info!(
        "Start a recording with: curl -X POST http://127.0.0.1:{}/record",
        config.api.port
    );
    info!(
        "Stop and save it with:  curl -X POST http://127.0.0.1:{}/stop",
        config.api.port
    );

    api_server.start().await
}
