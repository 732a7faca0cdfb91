//! Calibration session bookkeeping.
//!
//! The engine drives the calibration protocol itself; this type only
//! tracks what the session core needs to know about the one calibration
//! currently in flight.

use serde::{Deserialize, Serialize};

/// Number of targets in the five-point calibration protocol.
pub const CALIBRATION_POINT_COUNT: usize = 5;

/// Phase of a calibration session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationPhase {
    /// Created but the engine has not shown a target yet.
    NotStarted,
    /// The engine is walking through targets.
    InProgress,
    /// The engine reported completion.
    Finished,
}

/// A calibration target position on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTarget {
    pub x: f32,
    pub y: f32,
}

/// State of the single calibration session in flight.
///
/// Exactly one of these exists at a time; it is discarded on completion
/// or session teardown.
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    phase: CalibrationPhase,
    points_shown: usize,
    current_target: Option<CalibrationTarget>,
    current_point_progress: f32,
}

impl CalibrationSession {
    pub fn new() -> Self {
        Self {
            phase: CalibrationPhase::NotStarted,
            points_shown: 0,
            current_target: None,
            current_point_progress: 0.0,
        }
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    /// Targets shown so far (at most [`CALIBRATION_POINT_COUNT`]).
    pub fn points_shown(&self) -> usize {
        self.points_shown
    }

    pub fn current_target(&self) -> Option<CalibrationTarget> {
        self.current_target
    }

    /// Progress of the current point, as last reported by the engine.
    pub fn current_point_progress(&self) -> f32 {
        self.current_point_progress
    }

    /// Record a new target shown by the engine. Resets point progress.
    pub fn next_point(&mut self, x: f32, y: f32) {
        self.phase = CalibrationPhase::InProgress;
        self.points_shown += 1;
        self.current_target = Some(CalibrationTarget { x, y });
        self.current_point_progress = 0.0;
    }

    /// Record a progress report for the current point.
    ///
    /// Values are stored verbatim; the engine owns the [0, 1] contract.
    pub fn report_progress(&mut self, progress: f32) {
        self.current_point_progress = progress;
    }

    /// Record engine-reported completion.
    pub fn finish(&mut self) {
        self.phase = CalibrationPhase::Finished;
        self.current_target = None;
    }
}

impl Default for CalibrationSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_not_started() {
        let session = CalibrationSession::new();
        assert_eq!(session.phase(), CalibrationPhase::NotStarted);
        assert_eq!(session.points_shown(), 0);
        assert!(session.current_target().is_none());
    }

    #[test]
    fn test_next_point_advances_and_resets_progress() {
        let mut session = CalibrationSession::new();
        session.next_point(0.5, 0.5);
        session.report_progress(0.8);
        session.next_point(0.1, 0.9);

        assert_eq!(session.phase(), CalibrationPhase::InProgress);
        assert_eq!(session.points_shown(), 2);
        assert_eq!(session.current_point_progress(), 0.0);
        assert_eq!(
            session.current_target(),
            Some(CalibrationTarget { x: 0.1, y: 0.9 })
        );
    }

    #[test]
    fn test_finish_clears_target() {
        let mut session = CalibrationSession::new();
        for _ in 0..CALIBRATION_POINT_COUNT {
            session.next_point(0.5, 0.5);
        }
        session.finish();

        assert_eq!(session.phase(), CalibrationPhase::Finished);
        assert_eq!(session.points_shown(), CALIBRATION_POINT_COUNT);
        assert!(session.current_target().is_none());
    }
}
