// End-to-end tests over the capture-write → catalog → playback pipeline
// and the studio's session bookkeeping, all without audio devices.

use anyhow::Result;
use phonautograph::audio::format::SAMPLE_RATE;
use phonautograph::audio::{write_recording, AudioOutput, AudioSink, ProgressHandle, SinkSpec};
use phonautograph::audio::PlaybackSession;
use phonautograph::config::Config;
use phonautograph::library::RecordingLibrary;
use phonautograph::studio::{Studio, StudioPhase};
use phonautograph::StudioError;
use std::sync::{Arc, Mutex};

struct CollectingSink(Arc<Mutex<Vec<i16>>>);

impl AudioSink for CollectingSink {
    fn write(&mut self, frames: &[i16]) -> Result<(), StudioError> {
        self.0.lock().unwrap().extend_from_slice(frames);
        Ok(())
    }

    fn drain(&mut self) {}

    fn close(&mut self) {}
}

struct CollectingOutput(Arc<Mutex<Vec<i16>>>);

impl AudioOutput for CollectingOutput {
    fn open(&self, _spec: SinkSpec) -> Result<Box<dyn AudioSink>, StudioError> {
        Ok(Box::new(CollectingSink(self.0.clone())))
    }
}

#[test]
fn saved_recording_flows_through_catalog_and_playback() -> Result<()> {
    let dir = tempfile::tempdir()?;

    // Two seconds of silence at the capture format.
    let samples = vec![0i16; 2 * SAMPLE_RATE as usize];
    let recording = write_recording(dir.path(), &samples)?;
    assert_eq!(recording.sample_count, 32_000);

    // The catalog sees the file through a plain rescan.
    let library = RecordingLibrary::open(dir.path())?;
    assert_eq!(library.list(), vec![recording.file_name.clone()]);

    // Play it back through a collecting sink and compare sample for sample.
    let played = Arc::new(Mutex::new(Vec::new()));
    let session = PlaybackSession::start(
        &library.resolve(&recording.file_name),
        Box::new(CollectingOutput(played.clone())),
        ProgressHandle::default(),
    )?;
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while !session.is_finished() && std::time::Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    let outcome = session.stop()?;

    assert!(outcome.completed);
    assert_eq!(played.lock().unwrap().len(), samples.len());
    Ok(())
}

fn studio_in(dir: &std::path::Path) -> Result<Studio> {
    let mut config = Config::default();
    config.audio.recordings_dir = dir.to_string_lossy().into_owned();
    // The local provider initializes without a model; it only fails when
    // actually asked to transcribe.
    Ok(Studio::new(&config)?)
}

#[tokio::test]
async fn stopping_with_no_session_is_a_no_op() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let studio = studio_in(dir.path())?;

    assert!(studio.stop_recording().await?.is_none());
    assert!(studio.pause().await?.is_none());
    assert_eq!(studio.status().await.phase, StudioPhase::Idle);
    Ok(())
}

#[tokio::test]
async fn playing_a_missing_catalog_entry_is_not_found() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let studio = studio_in(dir.path())?;

    let err = studio.play("ghost.wav").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StudioError>(),
        Some(StudioError::NotFound(_))
    ));
    assert_eq!(studio.status().await.phase, StudioPhase::Idle);
    Ok(())
}

#[tokio::test]
async fn transcribing_a_missing_catalog_entry_is_not_found() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let studio = studio_in(dir.path())?;

    let err = studio.transcribe("ghost.wav").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StudioError>(),
        Some(StudioError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
#[ignore] // Requires a microphone
async fn records_from_the_default_input_device() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let studio = studio_in(dir.path())?;

    studio.start_recording().await?;
    assert_eq!(studio.status().await.phase, StudioPhase::Recording);

    // Starting again while recording must be rejected as busy.
    let err = studio.start_recording().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StudioError>(),
        Some(StudioError::Device(_))
    ));

    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    let recording = studio.stop_recording().await?.expect("a recording");
    assert!(recording.sample_count > 0);
    assert!(studio.recordings().contains(&recording.file_name));
    Ok(())
}
