//! Recording control endpoints.
//!
//! - POST /record - open the input stream and start accumulating
//! - POST /stop   - close the stream, save the WAV, update the catalog
//! - GET  /status - current phase and last error

use crate::api::error::ApiResult;
use crate::studio::Studio;
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

pub fn router(studio: Arc<Studio>) -> Router {
    Router::new()
        .route("/record", post(start_recording))
        .route("/stop", post(stop_recording))
        .route("/status", get(status))
        .with_state(studio)
}

async fn start_recording(State(studio): State<Arc<Studio>>) -> ApiResult<Json<Value>> {
    info!("Record command received via API");
    studio.start_recording().await?;
    Ok(Json(json!({
        "success": true,
        "phase": "recording",
    })))
}

/// Stopping with nothing active is fine; the response says whether a file
/// was produced.
async fn stop_recording(State(studio): State<Arc<Studio>>) -> ApiResult<Json<Value>> {
    info!("Stop command received via API");
    let recording = studio.stop_recording().await?;
    let saved = recording.map(|r| {
        json!({
            "file_name": r.file_name,
            "duration_secs": r.duration_secs,
            "sample_count": r.sample_count,
        })
    });
    Ok(Json(json!({
        "success": true,
        "recording": saved,
    })))
}

async fn status(State(studio): State<Arc<Studio>>) -> Json<Value> {
    let status = studio.status().await;
    Json(json!({
        "phase": status.phase.as_str(),
        "last_error": status.last_error,
        "progress": studio.progress(),
    }))
}
