//! Amplitude-vs-time rendering of the in-progress capture buffer.
//!
//! `render` is a pure function of the sample buffer; the only state anywhere
//! is the last-rendered frame held by `WaveformHandle`. The capture callback
//! publishes a fresh frame every few chunks and the shell reads a copy, so
//! reader and writer never share a buffer.

use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Upper bound on plotted points; longer buffers are decimated.
const MAX_POINTS: usize = 4096;

/// Number of labels along the time axis.
const TIME_TICKS: usize = 10;

/// One renderable plot frame.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WaveformFrame {
    /// (seconds, amplitude) pairs, amplitude within the 16-bit signed range.
    pub points: Vec<(f32, i16)>,
    /// Time-axis labels as (seconds, "1.25s") pairs.
    pub ticks: Vec<(f32, String)>,
    pub duration_secs: f32,
    pub sample_rate: u32,
    /// Amplitude axis bounds; always the full 16-bit range.
    pub amplitude_range: (i32, i32),
}

/// Render the buffer into a plot frame, rescaling the time axis by the
/// sample rate and clipping amplitudes to the 16-bit range.
pub fn render(samples: &[i16], sample_rate: u32) -> WaveformFrame {
    let duration_secs = samples.len() as f32 / sample_rate as f32;

    let stride = samples.len().div_ceil(MAX_POINTS).max(1);
    let points = samples
        .iter()
        .step_by(stride)
        .enumerate()
        .map(|(i, &amplitude)| {
            let secs = (i * stride) as f32 / sample_rate as f32;
            (secs, amplitude)
        })
        .collect();

    let ticks = time_ticks(duration_secs);

    WaveformFrame {
        points,
        ticks,
        duration_secs,
        sample_rate,
        amplitude_range: (i16::MIN as i32, i16::MAX as i32),
    }
}

fn time_ticks(duration_secs: f32) -> Vec<(f32, String)> {
    if duration_secs <= 0.0 {
        return Vec::new();
    }
    (0..TIME_TICKS)
        .map(|i| {
            let secs = duration_secs * i as f32 / (TIME_TICKS - 1) as f32;
            (secs, format!("{secs:.2}s"))
        })
        .collect()
}

/// Shared slot for the last-rendered frame. Writers replace the frame,
/// readers take a copy; the lock is never held across a render.
#[derive(Clone, Default)]
pub struct WaveformHandle {
    inner: Arc<Mutex<WaveformFrame>>,
}

impl WaveformHandle {
    pub fn publish(&self, frame: WaveformFrame) {
        *self.inner.lock().unwrap() = frame;
    }

    pub fn snapshot(&self) -> WaveformFrame {
        self.inner.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.publish(WaveformFrame::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::format::SAMPLE_RATE;

    #[test]
    fn empty_buffer_renders_empty_frame() {
        let frame = render(&[], SAMPLE_RATE);
        assert!(frame.points.is_empty());
        assert!(frame.ticks.is_empty());
        assert_eq!(frame.duration_secs, 0.0);
    }

    #[test]
    fn time_axis_rescales_with_sample_rate() {
        let samples = vec![0i16; 16_000];
        let frame = render(&samples, 16_000);
        assert!((frame.duration_secs - 1.0).abs() < 1e-6);

        let frame = render(&samples, 8_000);
        assert!((frame.duration_secs - 2.0).abs() < 1e-6);
    }

    #[test]
    fn long_buffers_are_decimated() {
        let samples = vec![100i16; SAMPLE_RATE as usize * 60];
        let frame = render(&samples, SAMPLE_RATE);
        assert!(frame.points.len() <= MAX_POINTS);
        // Last point still lands near the end of the buffer.
        let (last_secs, _) = *frame.points.last().unwrap();
        assert!(last_secs > 59.0);
    }

    #[test]
    fn short_buffers_keep_every_sample() {
        let samples: Vec<i16> = (0..100).map(|i| i as i16).collect();
        let frame = render(&samples, SAMPLE_RATE);
        assert_eq!(frame.points.len(), 100);
        assert_eq!(frame.points[0], (0.0, 0));
    }

    #[test]
    fn ticks_span_the_duration() {
        let samples = vec![0i16; SAMPLE_RATE as usize * 4];
        let frame = render(&samples, SAMPLE_RATE);
        assert_eq!(frame.ticks.len(), 10);
        assert_eq!(frame.ticks[0].1, "0.00s");
        assert_eq!(frame.ticks[9].1, "4.00s");
    }

    #[test]
    fn amplitude_range_is_full_16_bit() {
        let frame = render(&[i16::MIN, 0, i16::MAX], SAMPLE_RATE);
        assert_eq!(frame.amplitude_range, (-32768, 32767));
    }

    #[test]
    fn handle_snapshot_is_a_copy() {
        let handle = WaveformHandle::default();
        handle.publish(render(&[1, 2, 3], SAMPLE_RATE));
        let snap = handle.snapshot();
        handle.clear();
        assert_eq!(snap.points.len(), 3);
        assert!(handle.snapshot().points.is_empty());
    }
}
