//! Transcription endpoint.
//!
//! - POST /transcribe - run speech-to-text plus sentiment over a recording

use crate::api::error::ApiResult;
use crate::studio::Studio;
use axum::{extract::State, response::Json, routing::post, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct TranscribeRequest {
    pub file: String,
}

pub fn router(studio: Arc<Studio>) -> Router {
    Router::new()
        .route("/transcribe", post(transcribe))
        .with_state(studio)
}

async fn transcribe(
    State(studio): State<Arc<Studio>>,
    Json(request): Json<TranscribeRequest>,
) -> ApiResult<Json<Value>> {
    info!("Transcribe command received via API: {}", request.file);
    let analysis = studio.transcribe(&request.file).await?;
    Ok(Json(json!({
        "file": request.file,
        "language": analysis.language,
        "text": analysis.text,
        "sentiment": analysis.sentiment.as_str(),
    })))
}
