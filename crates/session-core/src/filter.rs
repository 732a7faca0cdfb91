//! Sample filter adapter.

use gazelog_engine::OneEuroFilterBank;
use gazelog_session_model::EngineTimestampMs;

/// Adapter over the engine-supplied smoothing filter.
///
/// The underlying recurrence needs one prior sample to estimate a
/// derivative, so the first [`admit`](FilterAdapter::admit) on a fresh
/// adapter always returns false. A new adapter must be constructed for
/// every tracking session; stale recurrence state across sessions is a
/// defect.
#[derive(Debug)]
pub struct FilterAdapter {
    bank: OneEuroFilterBank,
}

impl FilterAdapter {
    /// Fresh filter state for a new tracking session.
    pub fn new() -> Self {
        Self {
            // x and y share the engine timestamp stream
            bank: OneEuroFilterBank::new(2),
        }
    }

    /// Feed a raw gaze event; returns whether smoothed output is valid.
    ///
    /// Each call advances internal state — admit/read pairs are not
    /// idempotent.
    pub fn admit(&mut self, timestamp_ms: EngineTimestampMs, x: f32, y: f32) -> bool {
        self.bank.filter_values(timestamp_ms, &[x, y])
    }

    /// Latest smoothed coordinates.
    ///
    /// Valid only after the most recent [`admit`](FilterAdapter::admit)
    /// returned true.
    pub fn latest(&self) -> (f32, f32) {
        let values = self.bank.filtered_values();
        (values[0], values[1])
    }
}

impl Default for FilterAdapter {
    fn default() -> Self {
        Self::new()
    }
}
