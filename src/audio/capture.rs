//! Microphone capture session.
//!
//! A dedicated worker thread owns the cpal input stream (streams are not
//! `Send`), accumulates 16-bit samples, and on stop writes the WAV and
//! returns the finished `Recording` through its join handle. Stream setup
//! errors are reported back to the caller over a ready channel instead of
//! dying silently on the worker.

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, info};

use crate::audio::format::{
    timestamped_name, wav_spec, CHANNELS, CHUNK_FRAMES, SAMPLE_RATE, WAVEFORM_CHUNK_INTERVAL,
};
use crate::audio::waveform::{self, WaveformHandle};
use crate::error::StudioError;

/// A finished, immutable recording on disk.
#[derive(Debug, Clone)]
pub struct Recording {
    pub file_name: String,
    pub path: PathBuf,
    pub sample_count: u64,
    pub duration_secs: f64,
}

/// Persist an accumulated sample buffer as a timestamped WAV in `dir`.
pub fn write_recording(dir: &Path, samples: &[i16]) -> Result<Recording> {
    let file_name = timestamped_name();
    let path = dir.join(&file_name);

    let mut writer =
        hound::WavWriter::create(&path, wav_spec()).context("Failed to create WAV file")?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;

    let recording = Recording {
        file_name,
        path,
        sample_count: samples.len() as u64,
        duration_secs: samples.len() as f64 / SAMPLE_RATE as f64,
    };

    info!(
        "Saved recording {} ({:.1}s, {} samples)",
        recording.file_name, recording.duration_secs, recording.sample_count
    );

    Ok(recording)
}

pub struct CaptureSession {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<Result<Recording>>>,
}

impl CaptureSession {
    /// Open the default input device at the fixed capture format and begin
    /// accumulating samples. Fails with a device error if no input device is
    /// available or the stream cannot be built.
    pub fn start(dir: PathBuf, waveform: WaveformHandle) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let (ready_tx, ready_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("capture".to_string())
            .spawn(move || -> Result<Recording> {
                let samples: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));

                let stream = match open_input_stream(samples.clone(), waveform.clone()) {
                    Ok(stream) => {
                        let _ = ready_tx.send(Ok(()));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return Err(anyhow!("capture aborted: input stream setup failed"));
                    }
                };

                while !stop_flag.load(Ordering::Relaxed) {
                    thread::sleep(Duration::from_millis(10));
                }

                // Releases the device before touching the filesystem.
                drop(stream);

                let samples = {
                    let mut guard = samples.lock().unwrap();
                    std::mem::take(&mut *guard)
                };

                waveform.publish(waveform::render(&samples, SAMPLE_RATE));

                write_recording(&dir, &samples)
            })
            .context("Failed to spawn capture worker")?;

        match ready_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(Ok(())) => Ok(Self {
                stop,
                worker: Some(worker),
            }),
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(e.into())
            }
            Err(_) => Err(StudioError::device("timed out waiting for the input stream").into()),
        }
    }

    /// Stop capturing, persist the buffer, and return the recording.
    /// Worker failures surface here rather than being lost with the thread.
    pub fn stop(mut self) -> Result<Recording> {
        self.stop.store(true, Ordering::Relaxed);
        let worker = self
            .worker
            .take()
            .ok_or_else(|| anyhow!("capture worker already joined"))?;
        worker
            .join()
            .map_err(|_| anyhow!("capture worker panicked"))?
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.stop.store(true, Ordering::Relaxed);
            let _ = worker.join();
        }
    }
}

fn open_input_stream(
    samples: Arc<Mutex<Vec<i16>>>,
    waveform: WaveformHandle,
) -> Result<cpal::Stream, StudioError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| StudioError::device("no input device available"))?;

    info!(
        "Capturing from input device: {}",
        device.name().unwrap_or_else(|_| "unknown".to_string())
    );

    let config = cpal::StreamConfig {
        channels: CHANNELS,
        sample_rate: cpal::SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Fixed(CHUNK_FRAMES as u32),
    };

    let mut chunks: u64 = 0;
    let err_fn = |err| error!("Input stream error: {}", err);

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let mut buffer = samples.lock().unwrap();
                buffer.extend(
                    data.iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16),
                );

                chunks += 1;
                if chunks % WAVEFORM_CHUNK_INTERVAL == 0 {
                    // Snapshot under the lock, render outside it.
                    let snapshot = buffer.clone();
                    drop(buffer);
                    waveform.publish(waveform::render(&snapshot, SAMPLE_RATE));
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| StudioError::device(format!("failed to open input stream: {e}")))?;

    stream
        .play()
        .map_err(|e| StudioError::device(format!("failed to start input stream: {e}")))?;

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_seconds_of_silence_round_trips_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let samples = vec![0i16; 2 * SAMPLE_RATE as usize];

        let recording = write_recording(dir.path(), &samples).unwrap();
        assert_eq!(recording.sample_count, 32_000);
        assert!((recording.duration_secs - 2.0).abs() < f64::EPSILON);

        let reader = hound::WavReader::open(&recording.path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.duration(), 32_000);
    }

    #[test]
    fn sample_count_tracks_duration_within_one_chunk() {
        let dir = tempfile::tempdir().unwrap();
        // A capture that stopped mid-chunk: 3.5 s plus a partial chunk.
        let n = (3.5 * SAMPLE_RATE as f64) as usize + 700;
        let samples = vec![0i16; n];

        let recording = write_recording(dir.path(), &samples).unwrap();
        let nominal = (recording.duration_secs * SAMPLE_RATE as f64) as i64;
        assert!((recording.sample_count as i64 - nominal).abs() <= CHUNK_FRAMES as i64);
    }

    #[test]
    fn recording_name_carries_the_wav_extension() {
        let dir = tempfile::tempdir().unwrap();
        let recording = write_recording(dir.path(), &[0i16; 16]).unwrap();
        assert!(recording.file_name.starts_with("recorded_audio_"));
        assert!(recording.file_name.ends_with(".wav"));
        assert!(recording.path.exists());
    }
}
