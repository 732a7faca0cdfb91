//! Recording buffer and window.

use gazelog_session_model::{EngineTimestampMs, GazeSample};

/// The interval during which filtered samples are persisted.
///
/// The start timestamp is fixed lazily by the first accepted sample and
/// never changes for the life of the window.
#[derive(Debug, Default)]
pub struct RecordingWindow {
    start_timestamp_ms: Option<EngineTimestampMs>,
    active: bool,
}

impl RecordingWindow {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Engine timestamp of the first accepted sample, once one exists.
    pub fn start_timestamp_ms(&self) -> Option<EngineTimestampMs> {
        self.start_timestamp_ms
    }
}

/// Append-only sequence of recorded gaze samples.
///
/// Samples are accepted only while the window is active; insertion order
/// is temporal order because the engine delivers timestamps in
/// non-decreasing order and the core never reorders. Size is bounded only
/// by recording duration.
#[derive(Debug, Default)]
pub struct RecordingBuffer {
    window: RecordingWindow,
    samples: Vec<GazeSample>,
}

impl RecordingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate the window. The start timestamp stays unset until the
    /// first sample arrives.
    pub fn open_window(&mut self) {
        self.window.active = true;
    }

    /// Deactivate the window; subsequent appends are no-ops.
    pub fn close_window(&mut self) {
        self.window.active = false;
    }

    pub fn window(&self) -> &RecordingWindow {
        &self.window
    }

    /// Append a filtered sample, or do nothing if the window is inactive.
    ///
    /// Returns whether the sample was accepted. The first accepted sample
    /// fixes the window start, making its relative time exactly zero.
    pub fn append(&mut self, timestamp_ms: EngineTimestampMs, x: f32, y: f32) -> bool {
        if !self.window.active {
            return false;
        }
        let start = *self.window.start_timestamp_ms.get_or_insert(timestamp_ms);
        self.samples.push(GazeSample::at(start, timestamp_ms, x, y));
        true
    }

    pub fn samples(&self) -> &[GazeSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Consume the buffer, yielding the recorded samples.
    pub fn into_samples(self) -> Vec<GazeSample> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_append_outside_window_is_a_noop() {
        let mut buffer = RecordingBuffer::new();
        assert!(!buffer.append(1000, 0.5, 0.5));
        assert!(buffer.is_empty());
        assert!(buffer.window().start_timestamp_ms().is_none());

        buffer.open_window();
        assert!(buffer.append(1000, 0.5, 0.5));
        buffer.close_window();

        assert!(!buffer.append(1050, 0.5, 0.5));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_first_sample_fixes_window_start() {
        let mut buffer = RecordingBuffer::new();
        buffer.open_window();
        assert!(buffer.window().start_timestamp_ms().is_none());

        buffer.append(1050, 0.5, 0.5);
        assert_eq!(buffer.window().start_timestamp_ms(), Some(1050));
        assert_eq!(buffer.samples()[0].time_secs, 0.0);

        buffer.append(1100, 0.5, 0.5);
        assert_eq!(buffer.window().start_timestamp_ms(), Some(1050));
        assert!((buffer.samples()[1].time_secs - 0.05).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_relative_times_are_monotonic(
            deltas in proptest::collection::vec(0u64..500, 1..64),
            start in 0u64..1_000_000,
        ) {
            let mut buffer = RecordingBuffer::new();
            buffer.open_window();

            let mut timestamp = start;
            for delta in deltas {
                timestamp += delta;
                buffer.append(timestamp, 0.5, 0.5);
            }

            let samples = buffer.samples();
            prop_assert_eq!(samples[0].time_secs, 0.0);
            for pair in samples.windows(2) {
                prop_assert!(pair[1].time_secs >= pair[0].time_secs);
            }
        }
    }
}
