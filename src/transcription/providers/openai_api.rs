//! OpenAI-compatible speech-to-text over HTTP.
//!
//! Posts the WAV as multipart form data to `/audio/transcriptions` with
//! `response_format=verbose_json`, which carries the detected language
//! alongside the text.

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, info};

use super::{Transcript, TranscriptionProvider};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

#[derive(Debug, Deserialize)]
struct VerboseResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIProvider {
    pub fn new(api_key: String, endpoint: Option<String>, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;
        let base_url = endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        info!("Initialized OpenAI provider with base URL: {}", base_url);

        Ok(Self {
            client,
            api_key,
            base_url,
            model,
        })
    }
}

impl TranscriptionProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai-api"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn transcribe<'a>(
        &'a self,
        audio_path: &'a Path,
        language: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Transcript>> + Send + 'a>> {
        Box::pin(async move {
            let audio_data = tokio::fs::read(audio_path)
                .await
                .context("Failed to read audio file")?;

            let file_name = audio_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("audio.wav")
                .to_string();

            debug!("Uploading {} ({} bytes)", file_name, audio_data.len());

            let file_part = Part::bytes(audio_data)
                .file_name(file_name)
                .mime_str("audio/wav")
                .context("Failed to build multipart body")?;

            let mut form = Form::new()
                .part("file", file_part)
                .text("model", self.model.clone())
                .text("response_format", "verbose_json");
            if !language.is_empty() && language != "auto" {
                form = form.text("language", language.to_string());
            }

            let response = self
                .client
                .post(format!("{}/audio/transcriptions", self.base_url))
                .header("Authorization", format!("Bearer {}", self.api_key))
                .multipart(form)
                .send()
                .await
                .context("Transcription request failed")?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorResponse>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                anyhow::bail!("Transcription API error ({status}): {message}");
            }

            let parsed: VerboseResponse = response
                .json()
                .await
                .context("Failed to parse transcription response")?;

            let language = parsed
                .language
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| {
                    if language.is_empty() || language == "auto" {
                        "en".to_string()
                    } else {
                        language.to_string()
                    }
                });

            info!("Transcription complete: {} chars", parsed.text.len());

            Ok(Transcript {
                language,
                text: parsed.text.trim().to_string(),
            })
        })
    }
}
