use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::WhisperConfig;
use crate::error::StudioError;
use crate::sentiment::{self, SentimentLabel};

pub mod providers;

pub use providers::{LocalWhisperProvider, OpenAIProvider, Transcript, TranscriptionProvider};

/// Transient backend failures are retried this many times before surfacing.
const MAX_RETRIES: u32 = 2;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

pub struct Transcriber {
    provider: Box<dyn TranscriptionProvider>,
    language: String,
}

impl std::fmt::Debug for Transcriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcriber")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl Transcriber {
    pub fn with_provider(provider_name: &str, config: ProviderConfig) -> Result<Self> {
        let language = config.language.clone().unwrap_or_else(|| "auto".to_string());

        let provider: Box<dyn TranscriptionProvider> = match provider_name {
            "local-whisper" => Box::new(LocalWhisperProvider::new(config.model_path)?),
            "openai-api" => {
                let api_key = config
                    .api_key
                    .context("api_key is required for the OpenAI API provider")?;
                let model = config.model.unwrap_or_else(|| "whisper-1".to_string());
                Box::new(OpenAIProvider::new(api_key, config.api_endpoint, model)?)
            }
            _ => bail!(
                "Unknown transcription provider '{}'. Supported providers: local-whisper, openai-api",
                provider_name
            ),
        };

        info!("Using {} for transcription", provider.name());

        Ok(Self { provider, language })
    }

    /// Transcribe a stored recording: (detected language, text). Fails with
    /// `NotFound` before touching the backend when the file is missing;
    /// backend failures are retried with backoff, then surfaced as `Model`.
    pub async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        if !audio_path.exists() {
            return Err(StudioError::NotFound(audio_path.to_path_buf()).into());
        }

        info!(
            "Transcribing audio file: {:?} with {}",
            audio_path,
            self.provider.name()
        );

        let mut attempt = 0;
        loop {
            match self.provider.transcribe(audio_path, &self.language).await {
                Ok(transcript) => return Ok(transcript),
                Err(e) if attempt < MAX_RETRIES => {
                    let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
                    warn!(
                        "Transcription attempt {} failed ({}), retrying in {:?}",
                        attempt + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(StudioError::model(e.to_string()).into()),
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub model: Option<String>,
    pub model_path: Option<String>,
    pub language: Option<String>,
    pub api_endpoint: Option<String>,
    pub api_key: Option<String>,
}

impl From<&WhisperConfig> for ProviderConfig {
    fn from(whisper: &WhisperConfig) -> Self {
        Self {
            model: whisper.model.clone(),
            model_path: whisper.model_path.clone(),
            language: whisper.language.clone(),
            api_endpoint: whisper.api_endpoint.clone(),
            api_key: whisper.api_key.clone(),
        }
    }
}

/// Transcript plus the sentiment label derived from it. Computed on demand;
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechAnalysis {
    pub language: String,
    pub text: String,
    pub sentiment: SentimentLabel,
}

pub struct TranscriptionService {
    transcriber: Transcriber,
}

impl TranscriptionService {
    pub fn new(transcriber: Transcriber) -> Self {
        Self { transcriber }
    }

    pub fn from_config(whisper: &WhisperConfig) -> Result<Self> {
        let provider = whisper.provider.as_deref().unwrap_or("local-whisper");
        let transcriber = Transcriber::with_provider(provider, ProviderConfig::from(whisper))?;
        Ok(Self::new(transcriber))
    }

    pub async fn analyze(&self, audio_path: &Path) -> Result<SpeechAnalysis> {
        let transcript = self.transcriber.transcribe(audio_path).await?;

        if transcript.text.trim().is_empty() {
            warn!("No speech detected in {:?}", audio_path);
        }

        let sentiment = sentiment::score(&transcript.text);

        Ok(SpeechAnalysis {
            language: transcript.language,
            text: transcript.text,
            sentiment,
        })
    }
}

/// Validate a provider selection without instantiating it; mirrors the
/// checks `with_provider` performs.
pub fn validate_provider_config(provider: &str, whisper: &WhisperConfig) -> Option<String> {
    match provider {
        "local-whisper" => {
            if whisper.model_path.is_none() {
                Some("Model path required for local whisper".to_string())
            } else {
                None
            }
        }
        "openai-api" => {
            if whisper.api_key.is_none() {
                Some("API key required for the OpenAI API".to_string())
            } else {
                None
            }
        }
        _ => Some(format!("Unknown provider: {}", provider)),
    }
}
