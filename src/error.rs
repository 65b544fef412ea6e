use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for session and analysis operations.
///
/// `Device` is fatal to the requested session and never retried. `NotFound`
/// aborts the operation before any device I/O. `Model` is retried with
/// backoff by the transcription layer before being surfaced.
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("audio device unavailable: {0}")]
    Device(String),

    #[error("recording not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("transcription backend failure: {0}")]
    Model(String),
}

impl StudioError {
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }
}
