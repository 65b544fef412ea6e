//! Fixed capture format and WAV naming.
//!
//! The capture path always records 16 kHz, 16-bit, mono. Playback follows
//! whatever format the stored file declares.

use hound::{SampleFormat, WavSpec};

/// Samples per second on the capture path.
pub const SAMPLE_RATE: u32 = 16_000;

/// Mono capture.
pub const CHANNELS: u16 = 1;

/// 16-bit signed samples.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Frames per I/O chunk. Also the cancellation granularity: a session
/// observes its stop flag once per chunk (~64 ms at 16 kHz).
pub const CHUNK_FRAMES: usize = 1024;

/// Waveform snapshots are published every this many captured chunks.
pub const WAVEFORM_CHUNK_INTERVAL: u64 = 4;

pub const RECORDING_EXTENSION: &str = "wav";

pub fn wav_spec() -> WavSpec {
    WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// File name for a recording finished now: `recorded_audio_<timestamp>.wav`.
pub fn timestamped_name() -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("recorded_audio_{timestamp}.{RECORDING_EXTENSION}")
}
