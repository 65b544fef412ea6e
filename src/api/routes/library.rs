//! Catalog endpoints.
//!
//! - GET /recordings - recordings in the working directory
//! - GET /waveform   - last rendered amplitude frame

use crate::studio::Studio;
use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn router(studio: Arc<Studio>) -> Router {
    Router::new()
        .route("/recordings", get(recordings))
        .route("/waveform", get(waveform))
        .with_state(studio)
}

/// Order is whatever the directory listing returned.
async fn recordings(State(studio): State<Arc<Studio>>) -> Json<Value> {
    Json(json!({
        "recordings": studio.recordings(),
    }))
}

async fn waveform(State(studio): State<Arc<Studio>>) -> Json<Value> {
    Json(json!(studio.waveform_frame()))
}
