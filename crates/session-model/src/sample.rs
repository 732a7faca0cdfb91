//! Gaze event and sample types.
//!
//! The engine stamps raw events in milliseconds on its own monotonic
//! clock and delivers them in non-decreasing timestamp order. Recorded
//! samples carry time relative to the first sample of the recording
//! window, in fractional seconds.

use serde::{Deserialize, Serialize};

/// Monotonic timestamp in milliseconds on the engine's clock.
pub type EngineTimestampMs = u64;

/// A raw gaze coordinate as delivered by the engine.
///
/// Transient: consumed synchronously by the sample filter and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawGazeEvent {
    /// Engine-clock milliseconds.
    #[serde(rename = "t")]
    pub timestamp_ms: EngineTimestampMs,

    /// Screen X coordinate.
    pub x: f32,

    /// Screen Y coordinate.
    pub y: f32,
}

impl RawGazeEvent {
    pub fn new(timestamp_ms: EngineTimestampMs, x: f32, y: f32) -> Self {
        Self { timestamp_ms, x, y }
    }
}

/// A filtered gaze sample accepted into the recording buffer.
///
/// Immutable once created; the buffer owns the only copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeSample {
    /// Seconds since the first sample of the recording window.
    pub time_secs: f64,

    /// Filtered screen X coordinate.
    pub x: f32,

    /// Filtered screen Y coordinate.
    pub y: f32,
}

impl GazeSample {
    /// Create a sample from an engine timestamp and the window start.
    ///
    /// `timestamp_ms` must not precede `window_start_ms`.
    pub fn at(
        window_start_ms: EngineTimestampMs,
        timestamp_ms: EngineTimestampMs,
        x: f32,
        y: f32,
    ) -> Self {
        Self {
            time_secs: gazelog_common::clock::elapsed_secs(window_start_ms, timestamp_ms),
            x,
            y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_relative_time() {
        let sample = GazeSample::at(1000, 1050, 0.5, 0.5);
        assert!((sample.time_secs - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_first_sample_is_zero() {
        let sample = GazeSample::at(1000, 1000, 0.5, 0.5);
        assert_eq!(sample.time_secs, 0.0);
    }

    #[test]
    fn test_raw_event_roundtrip() {
        let event = RawGazeEvent::new(1234, 0.5, 0.3);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"t\":1234"));
        let parsed: RawGazeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_relative_time_matches_engine_clock(
                start in 0u64..10_000_000,
                offset_ms in 0u64..3_600_000,
            ) {
                let sample = GazeSample::at(start, start + offset_ms, 0.5, 0.5);
                prop_assert!(sample.time_secs >= 0.0);
                prop_assert!((sample.time_secs - offset_ms as f64 / 1000.0).abs() < 1e-9);
            }
        }
    }
}
