pub mod capture;
pub mod format;
pub mod playback;
pub mod sink;
pub mod waveform;

pub use capture::{write_recording, CaptureSession, Recording};
pub use playback::{PlaybackOutcome, PlaybackSession, ProgressHandle};
pub use sink::{AudioOutput, AudioSink, RodioOutput, SinkSpec};
pub use waveform::{render, WaveformFrame, WaveformHandle};
