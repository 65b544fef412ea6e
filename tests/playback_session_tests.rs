// Integration tests for the playback session lifecycle.
//
// Real output devices are not available in CI, so these tests drive the
// session through an in-memory sink implementation of the output seam.

use anyhow::Result;
use phonautograph::audio::format::{wav_spec, CHUNK_FRAMES, SAMPLE_RATE};
use phonautograph::audio::{AudioOutput, AudioSink, PlaybackSession, ProgressHandle, SinkSpec};
use phonautograph::StudioError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct SinkState {
    frames: Vec<i16>,
    closed: bool,
}

struct MemorySink(Arc<Mutex<SinkState>>);

impl AudioSink for MemorySink {
    fn write(&mut self, frames: &[i16]) -> Result<(), StudioError> {
        self.0.lock().unwrap().frames.extend_from_slice(frames);
        // Pace writes a little so cancellation has a window to land in.
        std::thread::sleep(Duration::from_millis(2));
        Ok(())
    }

    fn drain(&mut self) {}

    fn close(&mut self) {
        self.0.lock().unwrap().closed = true;
    }
}

#[derive(Default)]
struct MemoryOutput {
    opens: Arc<AtomicUsize>,
    state: Arc<Mutex<SinkState>>,
}

impl AudioOutput for MemoryOutput {
    fn open(&self, _spec: SinkSpec) -> Result<Box<dyn AudioSink>, StudioError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySink(self.state.clone())))
    }
}

fn write_fixture(dir: &Path, name: &str, samples: &[i16]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = hound::WavWriter::create(&path, wav_spec()).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
    path
}

#[test]
fn plays_a_file_to_completion() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let samples: Vec<i16> = (0..(SAMPLE_RATE as usize / 2)).map(|i| (i % 251) as i16).collect();
    let path = write_fixture(dir.path(), "clip.wav", &samples);

    let output = MemoryOutput::default();
    let state = output.state.clone();
    let progress = ProgressHandle::default();

    let session = PlaybackSession::start(&path, Box::new(output), progress.clone())?;
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while !session.is_finished() && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    let outcome = session.stop()?;

    assert!(outcome.completed);
    let state = state.lock().unwrap();
    assert!(state.closed, "sink must be released on every exit path");
    assert_eq!(state.frames, samples);
    assert_eq!(progress.get(), 100);
    Ok(())
}

#[test]
fn missing_file_fails_before_any_device_io() {
    let dir = tempfile::tempdir().unwrap();
    let output = MemoryOutput::default();
    let opens = output.opens.clone();

    let err = PlaybackSession::start(
        &dir.path().join("nope.wav"),
        Box::new(output),
        ProgressHandle::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<StudioError>(),
        Some(StudioError::NotFound(_))
    ));
    assert_eq!(opens.load(Ordering::SeqCst), 0, "no sink may be opened");
}

#[test]
fn pause_cancels_within_one_chunk_and_releases_the_sink() -> Result<()> {
    let dir = tempfile::tempdir()?;
    // Ten seconds of audio; far more than a cancelled session should write.
    let samples = vec![123i16; SAMPLE_RATE as usize * 10];
    let path = write_fixture(dir.path(), "long.wav", &samples);

    let output = MemoryOutput::default();
    let state = output.state.clone();
    let progress = ProgressHandle::default();

    let session = PlaybackSession::start(&path, Box::new(output), progress.clone())?;
    session.pause();
    let outcome = session.stop()?;

    assert!(!outcome.completed);
    let state = state.lock().unwrap();
    assert!(state.closed);
    assert!(
        state.frames.len() < samples.len(),
        "cancellation must land before EOF"
    );
    assert!(progress.get() < 100, "100 is reserved for completion");
    Ok(())
}

#[test]
fn progress_is_monotonic_while_playing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let samples = vec![0i16; SAMPLE_RATE as usize * 5];
    let path = write_fixture(dir.path(), "five.wav", &samples);

    let output = MemoryOutput::default();
    let progress = ProgressHandle::default();
    let session = PlaybackSession::start(&path, Box::new(output), progress.clone())?;

    let mut seen = Vec::new();
    for _ in 0..20 {
        seen.push(progress.get());
        std::thread::sleep(Duration::from_millis(5));
    }
    session.pause();
    session.stop()?;
    seen.push(progress.get());

    assert!(
        seen.windows(2).all(|w| w[0] <= w[1]),
        "progress went backwards: {seen:?}"
    );
    Ok(())
}

#[test]
#[ignore] // Requires a real output device
fn plays_through_the_default_output_device() -> Result<()> {
    use phonautograph::audio::RodioOutput;

    let dir = tempfile::tempdir()?;
    let samples = vec![0i16; SAMPLE_RATE as usize / 4];
    let path = write_fixture(dir.path(), "real.wav", &samples);

    let session = PlaybackSession::start(&path, Box::new(RodioOutput), ProgressHandle::default())?;
    let outcome = session.stop()?;
    assert!(outcome.chunks_written <= samples.len().div_ceil(CHUNK_FRAMES) as u64);
    Ok(())
}
