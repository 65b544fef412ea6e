//! Output device seam for playback.
//!
//! `PlaybackSession` writes chunks through `AudioSink` so the session logic
//! never touches a device directly. The rodio-backed sink is the production
//! implementation; tests supply in-memory sinks.

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};
use std::time::Duration;
use tracing::debug;

use crate::error::StudioError;

/// Format an output sink is opened with; taken from the stored file's
/// header, not from the capture constants.
#[derive(Debug, Clone, Copy)]
pub struct SinkSpec {
    pub channels: u16,
    pub sample_rate: u32,
}

pub trait AudioSink {
    /// Queue one chunk of interleaved samples. Blocks while the device
    /// queue is full, so writes pace out at roughly real time.
    fn write(&mut self, frames: &[i16]) -> Result<(), StudioError>;

    /// Block until everything queued has played out.
    fn drain(&mut self);

    /// Stop immediately and release the device.
    fn close(&mut self);
}

/// Opens sinks. Implementations are `Send` so a session worker thread can
/// carry one across the spawn; the sink itself never leaves that thread.
pub trait AudioOutput: Send {
    fn open(&self, spec: SinkSpec) -> Result<Box<dyn AudioSink>, StudioError>;
}

/// Default output device via rodio.
pub struct RodioOutput;

impl AudioOutput for RodioOutput {
    fn open(&self, spec: SinkSpec) -> Result<Box<dyn AudioSink>, StudioError> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| StudioError::device(format!("no output device available: {e}")))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| StudioError::device(format!("failed to open output sink: {e}")))?;

        debug!(
            "Opened output sink: {} ch @ {} Hz",
            spec.channels, spec.sample_rate
        );

        Ok(Box::new(DeviceSink {
            _stream: stream,
            sink,
            spec,
        }))
    }
}

/// Keeps the stream alive for as long as the sink is open; dropping it
/// releases the device on every exit path.
struct DeviceSink {
    _stream: OutputStream,
    sink: Sink,
    spec: SinkSpec,
}

/// Chunks queued ahead of the one currently playing.
const QUEUE_DEPTH: usize = 2;

impl AudioSink for DeviceSink {
    fn write(&mut self, frames: &[i16]) -> Result<(), StudioError> {
        self.sink.append(SamplesBuffer::new(
            self.spec.channels,
            self.spec.sample_rate,
            frames.to_vec(),
        ));
        while self.sink.len() > QUEUE_DEPTH {
            std::thread::sleep(Duration::from_millis(5));
        }
        Ok(())
    }

    fn drain(&mut self) {
        self.sink.sleep_until_end();
    }

    fn close(&mut self) {
        self.sink.stop();
    }
}
