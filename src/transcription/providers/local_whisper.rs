//! Local transcription using whisper.cpp via whisper-rs.
//!
//! Offline inference against a ggml model file. Language detection runs on
//! the model itself; when nothing is detected (silence) the configured hint
//! is reported instead.

use anyhow::{bail, Context, Result};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use tracing::{info, warn};

use super::{Transcript, TranscriptionProvider};

pub struct LocalWhisperProvider {
    model_path: Option<String>,
}

impl LocalWhisperProvider {
    pub fn new(model_path: Option<String>) -> Result<Self> {
        Ok(Self { model_path })
    }
}

impl TranscriptionProvider for LocalWhisperProvider {
    fn name(&self) -> &'static str {
        "local-whisper"
    }

    fn is_available(&self) -> bool {
        self.model_path
            .as_deref()
            .map(|p| Path::new(p).exists())
            .unwrap_or(false)
    }

    fn transcribe<'a>(
        &'a self,
        audio_path: &'a Path,
        language: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Transcript>> + Send + 'a>> {
        let model_path = self.model_path.clone();
        let audio_path = audio_path.to_path_buf();
        let language = language.to_string();

        Box::pin(async move {
            // Inference is CPU-bound for seconds; keep it off the runtime.
            tokio::task::spawn_blocking(move || {
                transcribe_local(model_path.as_deref(), &audio_path, &language)
            })
            .await
            .context("Task join failed")?
        })
    }
}

fn transcribe_local(
    model_path: Option<&str>,
    audio_path: &Path,
    language_hint: &str,
) -> Result<Transcript> {
    use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

    let model_path = match model_path {
        Some(p) if !p.is_empty() => p,
        _ => bail!(
            "Whisper model path not configured. Set model_path under [whisper] in the config file."
        ),
    };

    if !Path::new(model_path).exists() {
        bail!(
            "Whisper model not found at: {}\n\
             Download a model from: https://huggingface.co/ggerganov/whisper.cpp/tree/main",
            model_path
        );
    }

    let samples = load_wav_mono_f32(audio_path)?;

    let ctx = WhisperContext::new_with_params(model_path, WhisperContextParameters::default())
        .context("Failed to load whisper model")?;

    let mut state = ctx.create_state().context("Failed to create whisper state")?;

    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    if language_hint.is_empty() || language_hint == "auto" {
        params.set_language(Some("auto"));
    } else {
        params.set_language(Some(language_hint));
    }
    params.set_print_special(false);
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    state
        .full(params, &samples)
        .context("Transcription failed")?;

    let num_segments = state
        .full_n_segments()
        .context("Failed to read segment count")?;
    let mut text = String::new();
    for i in 0..num_segments {
        if let Ok(segment_text) = state.full_get_segment_text(i) {
            text.push_str(&segment_text);
        }
    }
    let text = text.trim().to_string();

    let detected = state
        .full_lang_id_from_state()
        .ok()
        .and_then(whisper_rs::get_lang_str)
        .map(str::to_string);

    // Silence detects as nothing useful; fall back to the hint.
    let language = match detected {
        Some(lang) if !text.is_empty() => lang,
        _ => fallback_language(language_hint).to_string(),
    };

    if text.is_empty() {
        warn!("No speech detected in {:?}", audio_path);
    } else {
        info!("Transcribed {:?}: {} chars, language {}", audio_path, text.len(), language);
    }

    Ok(Transcript { language, text })
}

fn fallback_language(hint: &str) -> &str {
    if hint.is_empty() || hint == "auto" {
        "en"
    } else {
        hint
    }
}

/// Read a 16 kHz WAV into normalized f32 samples, averaging interleaved
/// channels down to mono. Whisper expects exactly this shape.
fn load_wav_mono_f32(path: &Path) -> Result<Vec<f32>> {
    let reader = hound::WavReader::open(path).context("Failed to open WAV file")?;
    let spec = reader.spec();

    if spec.sample_rate != 16_000 {
        bail!(
            "Unsupported sample rate {} Hz (expected 16000 Hz)",
            spec.sample_rate
        );
    }
    if spec.bits_per_sample != 16 {
        bail!(
            "Unsupported sample width {} bits (expected 16-bit)",
            spec.bits_per_sample
        );
    }

    let channels = spec.channels as usize;
    let samples: Vec<i16> = reader
        .into_samples::<i16>()
        .collect::<std::result::Result<_, _>>()
        .context("Failed to read audio samples")?;

    let mono: Vec<f32> = samples
        .chunks(channels)
        .map(|frame| {
            let sum: f32 = frame.iter().map(|&s| s as f32).sum();
            sum / (channels as f32 * i16::MAX as f32)
        })
        .collect();

    Ok(mono)
}
