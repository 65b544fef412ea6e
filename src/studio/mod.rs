//! Session orchestration.
//!
//! Owns the single capture slot and the single playback slot, enforcing the
//! invariant that at most one of each exists and that they never run
//! together. Every session is an explicit object with its own cancellation
//! token and worker handle; worker failures come back through the join and
//! land in `last_error`, never lost with the thread.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::audio::{
    CaptureSession, PlaybackOutcome, PlaybackSession, ProgressHandle, Recording, RodioOutput,
    WaveformFrame, WaveformHandle,
};
use crate::config::Config;
use crate::error::StudioError;
use crate::library::RecordingLibrary;
use crate::transcription::{SpeechAnalysis, TranscriptionService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudioPhase {
    Idle,
    Recording,
    Playing,
}

impl StudioPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudioPhase::Idle => "idle",
            StudioPhase::Recording => "recording",
            StudioPhase::Playing => "playing",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StudioStatus {
    pub phase: StudioPhase,
    pub last_error: Option<String>,
}

impl Default for StudioStatus {
    fn default() -> Self {
        Self {
            phase: StudioPhase::Idle,
            last_error: None,
        }
    }
}

#[derive(Clone, Default)]
pub struct StatusHandle {
    inner: Arc<std::sync::Mutex<StudioStatus>>,
}

impl StatusHandle {
    pub fn get(&self) -> StudioStatus {
        self.inner.lock().unwrap().clone()
    }

    pub fn set(&self, phase: StudioPhase, last_error: Option<String>) {
        let mut status = self.inner.lock().unwrap();
        status.phase = phase;
        status.last_error = last_error;
    }
}

pub struct Studio {
    recordings_dir: PathBuf,
    library: RecordingLibrary,
    transcription: TranscriptionService,
    capture: Mutex<Option<CaptureSession>>,
    playback: Mutex<Option<PlaybackSession>>,
    waveform: WaveformHandle,
    progress: ProgressHandle,
    status: StatusHandle,
}

impl Studio {
    pub fn new(config: &Config) -> Result<Self> {
        let recordings_dir = config.recordings_dir();
        let library = RecordingLibrary::open(&recordings_dir)?;
        let transcription = TranscriptionService::from_config(&config.whisper)?;

        Ok(Self {
            recordings_dir,
            library,
            transcription,
            capture: Mutex::new(None),
            playback: Mutex::new(None),
            waveform: WaveformHandle::default(),
            progress: ProgressHandle::default(),
            status: StatusHandle::default(),
        })
    }

    /// Begin a capture session. Rejected as device-busy while another
    /// session (capture or playback) is live.
    pub async fn start_recording(&self) -> Result<()> {
        // Lock order is capture before playback everywhere.
        let mut capture = self.capture.lock().await;
        if capture.is_some() {
            return Err(StudioError::device("a capture session is already active").into());
        }
        {
            let mut playback = self.playback.lock().await;
            self.reap_finished_playback(&mut playback);
            if playback.is_some() {
                return Err(StudioError::device("playback is in progress").into());
            }
        }

        info!("Studio: starting capture");
        let dir = self.recordings_dir.clone();
        let waveform = self.waveform.clone();
        waveform.clear();

        let session = tokio::task::spawn_blocking(move || CaptureSession::start(dir, waveform))
            .await?
            .inspect_err(|e| {
                error!("Failed to start capture: {e}");
                self.status
                    .set(StudioPhase::Idle, Some(e.to_string()));
            })?;

        *capture = Some(session);
        self.status.set(StudioPhase::Recording, None);
        Ok(())
    }

    /// Stop the active capture session, persist it, and register the file
    /// in the catalog. A no-op when nothing is recording.
    pub async fn stop_recording(&self) -> Result<Option<Recording>> {
        let session = self.capture.lock().await.take();
        let Some(session) = session else {
            info!("Studio: stop requested with no active capture");
            return Ok(None);
        };

        let joined = tokio::task::spawn_blocking(move || session.stop()).await?;
        match joined {
            Ok(recording) => {
                self.library.append(recording.file_name.clone());
                self.status.set(StudioPhase::Idle, None);
                info!("Studio: capture stopped, saved {}", recording.file_name);
                Ok(Some(recording))
            }
            Err(e) => {
                self.status.set(StudioPhase::Idle, Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Play a catalog entry. Overlapping play requests are rejected rather
    /// than spawning a second stream over the same device.
    pub async fn play(&self, name: &str) -> Result<()> {
        let capture = self.capture.lock().await;
        if capture.is_some() {
            return Err(StudioError::device("a capture session is already active").into());
        }

        let mut playback = self.playback.lock().await;
        self.reap_finished_playback(&mut playback);
        if playback.is_some() {
            return Err(StudioError::device("playback is already in progress").into());
        }

        let path = self.library.resolve(name);
        info!("Studio: playing {}", path.display());

        let progress = self.progress.clone();
        let session = tokio::task::spawn_blocking(move || {
            PlaybackSession::start(&path, Box::new(RodioOutput), progress)
        })
        .await?
        .inspect_err(|e| {
            self.status.set(StudioPhase::Idle, Some(e.to_string()));
        })?;

        *playback = Some(session);
        self.status.set(StudioPhase::Playing, None);
        Ok(())
    }

    /// Cancel the active playback session after its current chunk. A no-op
    /// when nothing is playing.
    pub async fn pause(&self) -> Result<Option<PlaybackOutcome>> {
        let session = self.playback.lock().await.take();
        let Some(session) = session else {
            info!("Studio: pause requested with no active playback");
            return Ok(None);
        };

        session.pause();
        let joined = tokio::task::spawn_blocking(move || session.stop()).await?;
        match joined {
            Ok(outcome) => {
                self.status.set(StudioPhase::Idle, None);
                info!(
                    "Studio: playback stopped after {} chunks (completed: {})",
                    outcome.chunks_written, outcome.completed
                );
                Ok(Some(outcome))
            }
            Err(e) => {
                self.status.set(StudioPhase::Idle, Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Transcribe and sentiment-score a catalog entry.
    pub async fn transcribe(&self, name: &str) -> Result<SpeechAnalysis> {
        let path = self.library.resolve(name);
        self.transcription.analyze(&path).await
    }

    pub fn recordings(&self) -> Vec<String> {
        self.library.list()
    }

    pub fn waveform_frame(&self) -> WaveformFrame {
        self.waveform.snapshot()
    }

    pub fn progress(&self) -> u8 {
        self.progress.get()
    }

    pub async fn status(&self) -> StudioStatus {
        // A playback worker that ran to EOF leaves its slot occupied until
        // someone looks; reap it so the phase goes back to idle.
        let mut playback = self.playback.lock().await;
        self.reap_finished_playback(&mut playback);
        self.status.get()
    }

    fn reap_finished_playback(&self, slot: &mut Option<PlaybackSession>) {
        let finished = slot.as_ref().map(|s| s.is_finished()).unwrap_or(false);
        if !finished {
            return;
        }
        if let Some(session) = slot.take() {
            match session.stop() {
                Ok(outcome) => {
                    self.status.set(StudioPhase::Idle, None);
                    info!(
                        "Studio: playback finished ({} chunks)",
                        outcome.chunks_written
                    );
                }
                Err(e) => {
                    warn!("Playback worker failed: {e}");
                    self.status.set(StudioPhase::Idle, Some(e.to_string()));
                }
            }
        }
    }
}
