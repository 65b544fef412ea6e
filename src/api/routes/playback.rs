//! Playback control endpoints.
//!
//! - POST /play     - stream a recording to the output device
//! - POST /pause    - cancel after the current chunk
//! - GET  /progress - wall-clock progress percentage

use crate::api::error::ApiResult;
use crate::studio::Studio;
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    /// Catalog entry to play, e.g. `recorded_audio_2024-05-01_12-00-00.wav`.
    pub file: String,
}

pub fn router(studio: Arc<Studio>) -> Router {
    Router::new()
        .route("/play", post(play))
        .route("/pause", post(pause))
        .route("/progress", get(progress))
        .with_state(studio)
}

async fn play(
    State(studio): State<Arc<Studio>>,
    Json(request): Json<PlayRequest>,
) -> ApiResult<Json<Value>> {
    info!("Play command received via API: {}", request.file);
    studio.play(&request.file).await?;
    Ok(Json(json!({
        "success": true,
        "phase": "playing",
        "file": request.file,
    })))
}

async fn pause(State(studio): State<Arc<Studio>>) -> ApiResult<Json<Value>> {
    info!("Pause command received via API");
    let outcome = studio.pause().await?;
    Ok(Json(json!({
        "success": true,
        "stopped": outcome.is_some(),
        "completed": outcome.map(|o| o.completed),
    })))
}

/// Progress is derived from elapsed wall-clock time over the recording's
/// nominal duration, not from samples actually played.
async fn progress(State(studio): State<Arc<Studio>>) -> Json<Value> {
    Json(json!({
        "progress": studio.progress(),
    }))
}
