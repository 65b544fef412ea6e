//! REST API server - the UI shell.
//!
//! Provides HTTP endpoints for:
//! - Recording control (record, stop)
//! - Playback control (play, pause, progress)
//! - The recordings catalog
//! - Transcription with sentiment scoring
//! - The live waveform frame

use crate::config::Config;
use crate::studio::Studio;
use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;

pub mod error;
pub mod routes;

pub struct ApiServer {
    port: u16,
    studio: Arc<Studio>,
}

impl ApiServer {
    pub fn new(studio: Arc<Studio>, config: &Config) -> Self {
        Self {
            port: config.api.port,
            studio,
        }
    }

    pub async fn start(self) -> Result<()> {
        let app = Router::new()
            .route("/", get(service_info))
            .route("/version", get(version))
            .merge(routes::recording::router(self.studio.clone()))
            .merge(routes::playback::router(self.studio.clone()))
            .merge(routes::library::router(self.studio.clone()))
            .merge(routes::transcribe::router(self.studio.clone()))
            .layer(ServiceBuilder::new());

        let listener = tokio::net::TcpListener::bind(&format!("127.0.0.1:{}", self.port)).await?;

        info!("API server listening on http://127.0.0.1:{}", self.port);
        info!("Endpoints:");
        info!("  GET  /              - Service info");
        info!("  GET  /version       - Version info");
        info!("  POST /record        - Start recording");
        info!("  POST /stop          - Stop recording and save");
        info!("  POST /play          - Play a recording");
        info!("  POST /pause         - Pause playback");
        info!("  GET  /progress      - Playback progress");
        info!("  GET  /status        - Session status");
        info!("  GET  /recordings    - List recordings");
        info!("  GET  /waveform      - Last waveform frame");
        info!("  POST /transcribe    - Transcribe a recording");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn service_info() -> Json<Value> {
    Json(json!({
        "service": "phonautograph",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": "phonautograph"
    }))
}
