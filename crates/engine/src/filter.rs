//! One-euro smoothing filter bank.
//!
//! Streaming low-pass filter with a derivative-adaptive cutoff: slow
//! movement gets heavy smoothing, fast movement tracks tightly. The bank
//! filters N channels (here: gaze x and y) against one shared timestamp
//! stream.
//!
//! The recurrence needs one prior sample to estimate a derivative, so the
//! first call on a fresh bank never produces output. A bank must be
//! constructed fresh for every tracking session; recurrence state carried
//! across sessions produces samples anchored to a dead timeline.

use gazelog_session_model::EngineTimestampMs;

const DEFAULT_MIN_CUTOFF: f32 = 1.0;
const DEFAULT_BETA: f32 = 0.007;
const DEFAULT_DERIVATIVE_CUTOFF: f32 = 1.0;

/// Per-channel recurrence state: previous estimate and derivative.
#[derive(Debug, Clone, Copy)]
struct ChannelState {
    value: f32,
    derivative: f32,
}

/// Multi-channel one-euro filter sharing a timestamp stream.
#[derive(Debug)]
pub struct OneEuroFilterBank {
    channels: Vec<ChannelState>,
    last_timestamp_ms: Option<EngineTimestampMs>,
    output: Vec<f32>,
    min_cutoff: f32,
    beta: f32,
    derivative_cutoff: f32,
}

impl OneEuroFilterBank {
    /// Create a bank with default tuning for the given channel count.
    pub fn new(channel_count: usize) -> Self {
        Self::with_params(
            channel_count,
            DEFAULT_MIN_CUTOFF,
            DEFAULT_BETA,
            DEFAULT_DERIVATIVE_CUTOFF,
        )
    }

    /// Create a bank with explicit tuning.
    ///
    /// `min_cutoff` trades jitter against lag at low speeds; `beta` scales
    /// how quickly the cutoff opens up with speed.
    pub fn with_params(
        channel_count: usize,
        min_cutoff: f32,
        beta: f32,
        derivative_cutoff: f32,
    ) -> Self {
        Self {
            channels: Vec::with_capacity(channel_count),
            last_timestamp_ms: None,
            output: vec![0.0; channel_count],
            min_cutoff,
            beta,
            derivative_cutoff,
        }
    }

    /// Feed one timestamped value per channel.
    ///
    /// Returns whether the bank produced valid filtered output. The first
    /// call seeds the recurrence and returns false; a timestamp that does
    /// not advance the clock is rejected without touching state.
    pub fn filter_values(&mut self, timestamp_ms: EngineTimestampMs, values: &[f32]) -> bool {
        assert_eq!(
            values.len(),
            self.output.len(),
            "value count must match channel count"
        );

        let Some(last) = self.last_timestamp_ms else {
            self.channels = values
                .iter()
                .map(|&value| ChannelState {
                    value,
                    derivative: 0.0,
                })
                .collect();
            self.last_timestamp_ms = Some(timestamp_ms);
            return false;
        };

        if timestamp_ms <= last {
            // No derivative exists for a zero interval; the engine clock
            // never goes backwards.
            return false;
        }

        let dt_secs = (timestamp_ms - last) as f32 / 1000.0;
        let derivative_alpha = smoothing_factor(dt_secs, self.derivative_cutoff);

        for (channel, (&value, out)) in self
            .channels
            .iter_mut()
            .zip(values.iter().zip(self.output.iter_mut()))
        {
            let raw_derivative = (value - channel.value) / dt_secs;
            let derivative =
                exponential_smoothing(derivative_alpha, raw_derivative, channel.derivative);

            let cutoff = self.min_cutoff + self.beta * derivative.abs();
            let alpha = smoothing_factor(dt_secs, cutoff);
            let filtered = exponential_smoothing(alpha, value, channel.value);

            channel.derivative = derivative;
            channel.value = filtered;
            *out = filtered;
        }

        self.last_timestamp_ms = Some(timestamp_ms);
        true
    }

    /// Latest filtered values.
    ///
    /// Valid only after the most recent [`filter_values`] returned true.
    pub fn filtered_values(&self) -> &[f32] {
        &self.output
    }
}

fn smoothing_factor(dt_secs: f32, cutoff: f32) -> f32 {
    let r = 2.0 * std::f32::consts::PI * cutoff * dt_secs;
    r / (r + 1.0)
}

fn exponential_smoothing(alpha: f32, value: f32, prev: f32) -> f32 {
    prev + alpha * (value - prev)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_sample_is_not_valid() {
        let mut bank = OneEuroFilterBank::new(2);
        assert!(!bank.filter_values(1000, &[0.5, 0.5]));
        assert!(bank.filter_values(1033, &[0.5, 0.5]));
    }

    #[test]
    fn test_constant_input_passes_through() {
        let mut bank = OneEuroFilterBank::new(2);
        bank.filter_values(0, &[0.5, 0.25]);
        for t in [33u64, 66, 100, 133] {
            assert!(bank.filter_values(t, &[0.5, 0.25]));
            assert_eq!(bank.filtered_values(), &[0.5, 0.25]);
        }
    }

    #[test]
    fn test_jitter_is_reduced() {
        // Jittery gaze around (0.5, 0.5); filtered values should hug the
        // center more tightly than the raw excursions.
        let raw = [
            (0u64, 0.50, 0.50),
            (33, 0.56, 0.44),
            (66, 0.45, 0.55),
            (100, 0.54, 0.47),
            (133, 0.46, 0.53),
            (166, 0.52, 0.49),
        ];
        let mut bank = OneEuroFilterBank::new(2);
        for (t, x, y) in raw {
            bank.filter_values(t, &[x, y]);
        }
        let out = bank.filtered_values();
        assert!((out[0] - 0.5).abs() < 0.02, "x={} too far from center", out[0]);
        assert!((out[1] - 0.5).abs() < 0.02, "y={} too far from center", out[1]);
    }

    #[test]
    fn test_stalled_clock_is_rejected() {
        let mut bank = OneEuroFilterBank::new(1);
        bank.filter_values(100, &[0.1]);
        assert!(bank.filter_values(133, &[0.2]));
        let before = bank.filtered_values()[0];

        assert!(!bank.filter_values(133, &[0.9]));
        assert_eq!(bank.filtered_values()[0], before);

        // Clock resumes; filtering continues from the untouched state.
        assert!(bank.filter_values(166, &[0.3]));
    }

    proptest! {
        #[test]
        fn prop_output_stays_within_input_envelope(
            values in proptest::collection::vec(0.0f32..1.0, 2..64),
        ) {
            let mut bank = OneEuroFilterBank::new(1);
            let mut min = f32::MAX;
            let mut max = f32::MIN;
            for (i, &value) in values.iter().enumerate() {
                min = min.min(value);
                max = max.max(value);
                let valid = bank.filter_values(i as u64 * 33, &[value]);
                prop_assert_eq!(valid, i > 0);
                if valid {
                    let out = bank.filtered_values()[0];
                    prop_assert!(out >= min - 1e-4 && out <= max + 1e-4);
                }
            }
        }
    }
}
