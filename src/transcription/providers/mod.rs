use anyhow::Result;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

pub mod local_whisper;
pub mod openai_api;

pub use local_whisper::LocalWhisperProvider;
pub use openai_api::OpenAIProvider;

/// What a speech-to-text backend returns for one file.
#[derive(Debug, Clone)]
pub struct Transcript {
    /// Detected language code (or the configured hint when the backend
    /// reports nothing).
    pub language: String,
    pub text: String,
}

pub trait TranscriptionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool;

    fn transcribe<'a>(
        &'a self,
        audio_path: &'a Path,
        language: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Transcript>> + Send + 'a>>;
}
