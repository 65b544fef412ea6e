//! Playback session over a stored recording.
//!
//! A worker thread opens an output sink matching the file's format and
//! streams fixed-size chunks until EOF or the cancellation flag is seen.
//! The flag is checked once per chunk, so cancellation latency is one
//! chunk's duration. Progress is wall-clock elapsed over the file's nominal
//! duration - an approximation, not sample-accurate - and is monotonic by
//! construction (`fetch_max`), hitting 100 only once the final chunk has
//! drained.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::info;

use crate::audio::format::CHUNK_FRAMES;
use crate::audio::sink::{AudioOutput, AudioSink, SinkSpec};
use crate::error::StudioError;

/// Monotonic 0-100 playback progress, shared with the shell.
#[derive(Clone, Default)]
pub struct ProgressHandle {
    percent: Arc<AtomicU8>,
}

impl ProgressHandle {
    /// Raise progress to `pct`; lower values are ignored so readers never
    /// observe a decrease.
    pub fn set(&self, pct: u8) {
        self.percent.fetch_max(pct.min(100), Ordering::Relaxed);
    }

    pub fn get(&self) -> u8 {
        self.percent.load(Ordering::Relaxed)
    }

    /// Rewind to zero between sessions.
    pub fn reset(&self) {
        self.percent.store(0, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlaybackOutcome {
    /// False when the session was cancelled before EOF.
    pub completed: bool,
    pub chunks_written: u64,
}

#[derive(Debug)]
pub struct PlaybackSession {
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<Result<PlaybackOutcome>>>,
}

impl PlaybackSession {
    /// Begin streaming `path` to an output sink. Fails with `NotFound`
    /// before any device I/O if the file is missing; device-open failures
    /// surface here through the worker's ready channel.
    pub fn start(
        path: &Path,
        output: Box<dyn AudioOutput>,
        progress: ProgressHandle,
    ) -> Result<Self> {
        if !path.exists() {
            return Err(StudioError::NotFound(path.to_path_buf()).into());
        }

        let reader = hound::WavReader::open(path).context("Failed to open WAV file")?;
        let spec = reader.spec();
        let sink_spec = SinkSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
        };
        let total = Duration::from_secs_f64(reader.duration() as f64 / spec.sample_rate as f64);
        let chunk_len = CHUNK_FRAMES * spec.channels as usize;

        info!(
            "Playing {} ({:.1}s, {} ch @ {} Hz)",
            path.display(),
            total.as_secs_f64(),
            spec.channels,
            spec.sample_rate
        );

        progress.reset();

        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_flag = cancel.clone();
        let (ready_tx, ready_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("playback".to_string())
            .spawn(move || -> Result<PlaybackOutcome> {
                let mut sink = match output.open(sink_spec) {
                    Ok(sink) => {
                        let _ = ready_tx.send(Ok(()));
                        sink
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return Err(anyhow!("playback aborted: output sink setup failed"));
                    }
                };

                stream_chunks(
                    reader.into_samples::<i16>(),
                    sink.as_mut(),
                    &cancel_flag,
                    &progress,
                    total,
                    chunk_len,
                )
            })
            .context("Failed to spawn playback worker")?;

        match ready_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(Ok(())) => Ok(Self {
                cancel,
                worker: Some(worker),
            }),
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(e.into())
            }
            Err(_) => Err(StudioError::device("timed out waiting for the output sink").into()),
        }
    }

    /// Request cancellation; the worker stops after the current chunk.
    pub fn pause(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.worker
            .as_ref()
            .map(JoinHandle::is_finished)
            .unwrap_or(true)
    }

    /// Cancel (if still running) and wait for the worker, surfacing its
    /// result to the initiator.
    pub fn stop(mut self) -> Result<PlaybackOutcome> {
        self.cancel.store(true, Ordering::Relaxed);
        let worker = self
            .worker
            .take()
            .ok_or_else(|| anyhow!("playback worker already joined"))?;
        worker
            .join()
            .map_err(|_| anyhow!("playback worker panicked"))?
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.cancel.store(true, Ordering::Relaxed);
            let _ = worker.join();
        }
    }
}

/// Mid-flight progress; 100 is reserved for completion.
fn progress_pct(elapsed: Duration, total: Duration) -> u8 {
    if total.is_zero() {
        return 99;
    }
    let pct = (elapsed.as_secs_f64() / total.as_secs_f64() * 100.0).floor();
    (pct as u8).min(99)
}

fn stream_chunks(
    mut samples: impl Iterator<Item = std::result::Result<i16, hound::Error>>,
    sink: &mut dyn AudioSink,
    cancel: &AtomicBool,
    progress: &ProgressHandle,
    total: Duration,
    chunk_len: usize,
) -> Result<PlaybackOutcome> {
    let started = Instant::now();
    let mut chunks_written = 0u64;

    loop {
        let chunk: Vec<i16> = samples
            .by_ref()
            .take(chunk_len)
            .collect::<std::result::Result<_, _>>()
            .context("Failed to read audio samples")?;

        if chunk.is_empty() {
            sink.drain();
            sink.close();
            progress.set(100);
            return Ok(PlaybackOutcome {
                completed: true,
                chunks_written,
            });
        }

        if cancel.load(Ordering::Relaxed) {
            sink.close();
            return Ok(PlaybackOutcome {
                completed: false,
                chunks_written,
            });
        }

        if let Err(e) = sink.write(&chunk) {
            sink.close();
            return Err(e.into());
        }
        chunks_written += 1;
        progress.set(progress_pct(started.elapsed(), total));
    }
}
