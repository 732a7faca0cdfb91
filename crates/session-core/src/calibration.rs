//! Calibration coordination.
//!
//! The engine drives the point sequence itself; the coordinator's job is
//! the choreography around it: marker placement, progress forwarding, and
//! the settle delay that gives the subject's gaze time to reach a target
//! before sample collection begins.

use std::time::Duration;

use tokio::sync::mpsc;

use gazelog_session_model::{CalibrationSession, CALIBRATION_POINT_COUNT};

use crate::events::{SessionEvent, UiCommand};

/// Coordinates the calibration in flight.
///
/// Created when calibration starts and discarded when it finishes; at
/// most one exists at a time.
pub struct CalibrationCoordinator {
    session: CalibrationSession,
    settle_delay: Duration,
    events: mpsc::UnboundedSender<SessionEvent>,
    ui: mpsc::UnboundedSender<UiCommand>,
}

impl CalibrationCoordinator {
    /// Start coordinating: brings up the overlay and hides the control
    /// that launched it.
    pub fn begin(
        settle_delay: Duration,
        events: mpsc::UnboundedSender<SessionEvent>,
        ui: mpsc::UnboundedSender<UiCommand>,
    ) -> Self {
        let coordinator = Self {
            session: CalibrationSession::new(),
            settle_delay,
            events,
            ui,
        };
        coordinator.send_ui(UiCommand::ShowCalibrationOverlay);
        coordinator.send_ui(UiCommand::HideCalibrationControl);
        coordinator
    }

    pub fn session(&self) -> &CalibrationSession {
        &self.session
    }

    /// The engine presented a new target.
    ///
    /// Repositions the marker, zeroes its animation, and schedules the
    /// settle-delayed collection trigger on its own task so the callback
    /// channel is never blocked.
    pub fn on_next_point(&mut self, x: f32, y: f32) {
        self.session.next_point(x, y);
        tracing::debug!(
            point = self.session.points_shown(),
            of = CALIBRATION_POINT_COUNT,
            x,
            y,
            "Calibration target shown"
        );
        self.send_ui(UiCommand::MoveCalibrationPoint { x, y });
        self.send_ui(UiCommand::SetCalibrationProgress(0.0));

        let events = self.events.clone();
        let delay = self.settle_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver may be gone if the session tore down while we
            // slept; the lost fire is the accepted best-effort race.
            let _ = events.send(SessionEvent::SettleElapsed);
        });
    }

    /// Forward a per-point progress report to the UI, verbatim.
    pub fn on_progress(&mut self, progress: f32) {
        self.session.report_progress(progress);
        self.send_ui(UiCommand::SetCalibrationProgress(progress));
    }

    /// The engine finished calibration; tear the overlay down.
    pub fn on_finished(&mut self, result: &[f64]) {
        self.session.finish();
        tracing::info!(
            points = self.session.points_shown(),
            result_len = result.len(),
            "Calibration finished"
        );
        self.send_ui(UiCommand::HideCalibrationOverlay);
        self.send_ui(UiCommand::ShowPlaybackControl);
    }

    fn send_ui(&self, command: UiCommand) {
        let _ = self.ui.send(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazelog_session_model::CalibrationPhase;

    fn drain(rx: &mut mpsc::UnboundedReceiver<UiCommand>) -> Vec<UiCommand> {
        let mut commands = Vec::new();
        while let Ok(command) = rx.try_recv() {
            commands.push(command);
        }
        commands
    }

    #[tokio::test]
    async fn test_begin_brings_up_overlay() {
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();

        let coordinator = CalibrationCoordinator::begin(Duration::ZERO, events_tx, ui_tx);
        assert_eq!(coordinator.session().phase(), CalibrationPhase::NotStarted);
        assert_eq!(
            drain(&mut ui_rx),
            vec![
                UiCommand::ShowCalibrationOverlay,
                UiCommand::HideCalibrationControl
            ]
        );
    }

    #[tokio::test]
    async fn test_next_point_schedules_settle_trigger() {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();

        let mut coordinator =
            CalibrationCoordinator::begin(Duration::from_millis(5), events_tx, ui_tx);
        coordinator.on_next_point(0.5, 0.5);

        let commands = drain(&mut ui_rx);
        assert!(commands.contains(&UiCommand::MoveCalibrationPoint { x: 0.5, y: 0.5 }));
        assert!(commands.contains(&UiCommand::SetCalibrationProgress(0.0)));

        let fired = tokio::time::timeout(Duration::from_secs(1), events_rx.recv())
            .await
            .expect("settle trigger never fired");
        assert!(matches!(fired, Some(SessionEvent::SettleElapsed)));
    }

    #[tokio::test]
    async fn test_progress_forwarded_verbatim() {
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();

        let mut coordinator = CalibrationCoordinator::begin(Duration::ZERO, events_tx, ui_tx);
        coordinator.on_next_point(0.1, 0.9);
        drain(&mut ui_rx);

        coordinator.on_progress(0.37);
        assert_eq!(
            drain(&mut ui_rx),
            vec![UiCommand::SetCalibrationProgress(0.37)]
        );
        assert_eq!(coordinator.session().current_point_progress(), 0.37);
    }
}
