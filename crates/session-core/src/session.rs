//! Session state machine driver.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use gazelog_common::config::SessionDefaults;
use gazelog_common::error::{GazelogError, GazelogResult};
use gazelog_engine::{
    AccuracyCriteria, CalibrationCallbacks, CalibrationMode, EngineHandle, EngineProvider,
    GazeEngine,
};
use gazelog_export::{write_samples, ExportTarget};
use gazelog_session_model::{GazeSample, RawGazeEvent};

use crate::buffer::RecordingBuffer;
use crate::calibration::CalibrationCoordinator;
use crate::events::{SessionEvent, UiCommand};
use crate::filter::FilterAdapter;
use crate::playback::VideoPlayer;

/// Configuration for one recording session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// License key handed to the engine at initialization.
    pub license_key: String,

    /// Settle delay before per-point sample collection begins.
    pub settle_delay: Duration,

    /// Calibration protocol to request.
    pub calibration_mode: CalibrationMode,

    /// Accuracy target for calibration.
    pub accuracy: AccuracyCriteria,
}

impl SessionConfig {
    /// Build a session config from the application defaults.
    pub fn from_defaults(defaults: &SessionDefaults) -> Self {
        Self {
            license_key: defaults.license_key.clone(),
            settle_delay: Duration::from_millis(defaults.settle_delay_ms),
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            license_key: String::new(),
            settle_delay: Duration::from_millis(1000),
            calibration_mode: CalibrationMode::FivePoint,
            accuracy: AccuracyCriteria::Default,
        }
    }
}

/// State of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Session created but not started.
    Idle,
    /// Waiting for the capture permission and engine initialization.
    PermissionPending,
    /// Engine live and tracking; not yet calibrated.
    Ready,
    /// Five-point calibration in flight.
    Calibrating,
    /// Calibrated and tracking; playback not started.
    TrackingIdle,
    /// Playback running; samples are being recorded.
    Recording,
    /// Playback completed; engine released; buffer ready for export.
    Finished,
    /// Buffer exported at least once.
    Exported,
    /// Unrecoverable failure; a full restart is required.
    Failed,
}

/// Summary handed back when the driver shuts down.
#[derive(Debug)]
pub struct SessionReport {
    pub final_state: SessionState,

    /// Wall-clock time at engine start (RFC 3339), if the engine came up.
    pub started_wall: Option<String>,

    /// The recorded samples, in temporal order.
    pub samples: Vec<GazeSample>,

    /// How many exports completed successfully.
    pub exports_completed: u32,
}

/// Handle for feeding events into a running driver.
#[derive(Clone)]
pub struct SessionClient {
    events: mpsc::UnboundedSender<SessionEvent>,
    state: watch::Receiver<SessionState>,
}

impl SessionClient {
    /// Send an event; silently dropped if the driver is gone.
    pub fn send(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    pub fn start(&self) {
        self.send(SessionEvent::Start);
    }

    pub fn grant_permission(&self) {
        self.send(SessionEvent::PermissionGranted);
    }

    pub fn deny_permission(&self) {
        self.send(SessionEvent::PermissionDenied);
    }

    pub fn start_calibration(&self) {
        self.send(SessionEvent::StartCalibration);
    }

    pub fn start_playback(&self) {
        self.send(SessionEvent::StartPlayback);
    }

    pub fn playback_completed(&self) {
        self.send(SessionEvent::PlaybackCompleted);
    }

    pub fn request_export(&self) {
        self.send(SessionEvent::RequestExport);
    }

    pub fn shutdown(&self) {
        self.send(SessionEvent::Shutdown);
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Wait until the driver reaches `target`.
    ///
    /// Returns immediately if the driver has already gone away.
    pub async fn wait_for(&mut self, target: SessionState) {
        loop {
            if *self.state.borrow_and_update() == target {
                return;
            }
            if self.state.changed().await.is_err() {
                return;
            }
        }
    }
}

/// The session orchestrator.
///
/// Owns the engine handle, filter state, recording buffer, and
/// calibration coordinator, and consumes every [`SessionEvent`] on a
/// single loop, validating the current state before acting. UI-visible
/// effects leave as [`UiCommand`]s; nothing here touches UI state.
pub struct SessionDriver {
    config: SessionConfig,
    state: SessionState,
    provider: Box<dyn EngineProvider>,
    handle: Option<EngineHandle>,
    filter: FilterAdapter,
    buffer: RecordingBuffer,
    calibration: Option<CalibrationCoordinator>,
    player: Box<dyn VideoPlayer>,
    export_target: Box<dyn ExportTarget>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    ui_tx: mpsc::UnboundedSender<UiCommand>,
    state_tx: watch::Sender<SessionState>,
    started_wall: Option<String>,
    exports_completed: u32,
}

impl SessionDriver {
    /// Create a driver plus the client and UI command stream for the host.
    pub fn new(
        config: SessionConfig,
        provider: Box<dyn EngineProvider>,
        player: Box<dyn VideoPlayer>,
        export_target: Box<dyn ExportTarget>,
    ) -> (Self, SessionClient, mpsc::UnboundedReceiver<UiCommand>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);

        let client = SessionClient {
            events: events_tx.clone(),
            state: state_rx,
        };

        let driver = Self {
            config,
            state: SessionState::Idle,
            provider,
            handle: None,
            filter: FilterAdapter::new(),
            buffer: RecordingBuffer::new(),
            calibration: None,
            player,
            export_target,
            events_tx,
            events_rx,
            ui_tx,
            state_tx,
            started_wall: None,
            exports_completed: 0,
        };

        (driver, client, ui_rx)
    }

    /// Run the event loop until shutdown or a fatal failure.
    ///
    /// Fatal failures (permission denied, engine initialization) leave
    /// the published state at [`SessionState::Failed`] and are returned
    /// to the caller; everything else is absorbed where it occurs.
    pub async fn run(mut self) -> GazelogResult<SessionReport> {
        tracing::info!("Session driver started");

        while let Some(event) = self.events_rx.recv().await {
            if matches!(event, SessionEvent::Shutdown) {
                tracing::info!("Session shutting down");
                break;
            }
            if let Err(error) = self.handle_event(event).await {
                self.fail(&error);
                return Err(error);
            }
        }

        self.teardown();
        Ok(self.into_report())
    }

    async fn handle_event(&mut self, event: SessionEvent) -> GazelogResult<()> {
        match event {
            SessionEvent::Start => self.on_start(),
            SessionEvent::PermissionGranted => self.on_permission_granted().await?,
            SessionEvent::PermissionDenied => {
                if self.state == SessionState::PermissionPending {
                    return Err(GazelogError::permission_denied(
                        "capture permission was not granted",
                    ));
                }
                self.ignore(&SessionEvent::PermissionDenied);
            }
            SessionEvent::StartCalibration => self.on_start_calibration()?,
            SessionEvent::CalibrationNextPoint { x, y } => self.on_calibration_next_point(x, y),
            SessionEvent::CalibrationProgress(progress) => self.on_calibration_progress(progress),
            SessionEvent::CalibrationFinished(result) => self.on_calibration_finished(&result),
            SessionEvent::SettleElapsed => self.on_settle_elapsed(),
            SessionEvent::StartPlayback => self.on_start_playback(),
            SessionEvent::Gaze(raw) => self.on_gaze(raw),
            SessionEvent::PlaybackCompleted => self.on_playback_completed(),
            SessionEvent::RequestExport => self.on_request_export(),
            SessionEvent::Shutdown => unreachable!("handled by the run loop"),
        }
        Ok(())
    }

    fn on_start(&mut self) {
        if self.state != SessionState::Idle {
            self.ignore(&SessionEvent::Start);
            return;
        }
        self.transition(SessionState::PermissionPending);
    }

    async fn on_permission_granted(&mut self) -> GazelogResult<()> {
        if self.state != SessionState::PermissionPending {
            self.ignore(&SessionEvent::PermissionGranted);
            return Ok(());
        }

        let mut engine = self
            .provider
            .initialize(&self.config.license_key)
            .await
            .map_err(GazelogError::from)?;

        self.wire_callbacks(engine.as_mut());
        engine.start_tracking()?;

        // Fresh recurrence state for the new tracking session.
        self.filter = FilterAdapter::new();
        self.started_wall = Some(chrono::Utc::now().to_rfc3339());

        tracing::info!(
            engine = engine.name(),
            started_wall = self.started_wall.as_deref().unwrap_or(""),
            "Gaze engine tracking"
        );

        self.handle = Some(EngineHandle::new(engine));
        self.transition(SessionState::Ready);
        self.ui(UiCommand::ShowCalibrationControl);
        Ok(())
    }

    fn on_start_calibration(&mut self) -> GazelogResult<()> {
        if !matches!(
            self.state,
            SessionState::Ready | SessionState::TrackingIdle
        ) {
            self.ignore(&SessionEvent::StartCalibration);
            return Ok(());
        }

        let mode = self.config.calibration_mode;
        let accuracy = self.config.accuracy;
        let Some(engine) = self.engine_mut() else {
            return Err(GazelogError::session("no live engine for calibration"));
        };
        engine.start_calibration(mode, accuracy)?;

        // Recorded-but-unexported samples survive a re-calibration; only a
        // brand-new session starts with an empty buffer.
        self.calibration = Some(CalibrationCoordinator::begin(
            self.config.settle_delay,
            self.events_tx.clone(),
            self.ui_tx.clone(),
        ));
        self.transition(SessionState::Calibrating);
        Ok(())
    }

    fn on_calibration_next_point(&mut self, x: f32, y: f32) {
        if self.state != SessionState::Calibrating {
            self.ignore(&SessionEvent::CalibrationNextPoint { x, y });
            return;
        }
        if let Some(coordinator) = self.calibration.as_mut() {
            coordinator.on_next_point(x, y);
        }
    }

    fn on_calibration_progress(&mut self, progress: f32) {
        if self.state != SessionState::Calibrating {
            self.ignore(&SessionEvent::CalibrationProgress(progress));
            return;
        }
        if let Some(coordinator) = self.calibration.as_mut() {
            coordinator.on_progress(progress);
        }
    }

    fn on_calibration_finished(&mut self, result: &[f64]) {
        if self.state != SessionState::Calibrating {
            tracing::debug!(state = ?self.state, "Ignoring calibration-finished outside calibration");
            return;
        }
        if let Some(mut coordinator) = self.calibration.take() {
            coordinator.on_finished(result);
        }
        self.transition(SessionState::TrackingIdle);
    }

    /// The settle delay fired. The delayed task cannot be cancelled, so
    /// this re-validates everything before commanding the engine; a stale
    /// fire is absorbed silently.
    fn on_settle_elapsed(&mut self) {
        if self.state != SessionState::Calibrating {
            tracing::debug!(state = ?self.state, "Stale settle trigger, ignoring");
            return;
        }
        let Some(engine) = self.engine_mut() else {
            return;
        };
        if engine.is_calibrating() {
            let accepted = engine.begin_sample_collection();
            tracing::debug!(accepted, "Calibration sample collection requested");
        } else {
            tracing::debug!("Engine no longer calibrating, skipping sample collection");
        }
    }

    fn on_start_playback(&mut self) {
        if self.state != SessionState::TrackingIdle {
            self.ignore(&SessionEvent::StartPlayback);
            return;
        }
        if let Err(error) = self.player.start() {
            // Playback never started; the session stays calibrated and the
            // user can try again.
            tracing::warn!(error = %error, player = self.player.name(), "Failed to start playback");
            return;
        }
        self.buffer.open_window();
        self.transition(SessionState::Recording);
        self.ui(UiCommand::HidePlaybackControl);
        self.ui(UiCommand::ShowVideoSurface);
    }

    fn on_gaze(&mut self, raw: RawGazeEvent) {
        if !self.filter.admit(raw.timestamp_ms, raw.x, raw.y) {
            return;
        }
        let (x, y) = self.filter.latest();
        // The buffer refuses samples while the window is inactive, so gaze
        // during calibration or idle tracking only advances the filter.
        self.buffer.append(raw.timestamp_ms, x, y);
    }

    fn on_playback_completed(&mut self) {
        if self.state != SessionState::Recording {
            self.ignore(&SessionEvent::PlaybackCompleted);
            return;
        }
        self.buffer.close_window();

        if let Some(handle) = self.handle.as_mut() {
            if let Err(error) = handle.release() {
                tracing::warn!(error = %error, "Engine release failed");
            }
        }

        tracing::info!(samples = self.buffer.len(), "Recording finished");
        self.transition(SessionState::Finished);
        self.ui(UiCommand::HideVideoSurface);
        self.ui(UiCommand::ShowExportControl);
    }

    fn on_request_export(&mut self) {
        if !matches!(
            self.state,
            SessionState::Finished | SessionState::Exported
        ) {
            self.ignore(&SessionEvent::RequestExport);
            return;
        }

        match self.export_buffer() {
            Ok(rows) => {
                self.exports_completed += 1;
                tracing::info!(rows, destination = self.export_target.name(), "Export completed");
                self.transition(SessionState::Exported);
                self.ui(UiCommand::ExportCompleted { rows });
            }
            Err(error) => {
                // The buffer is untouched; the user may retry.
                tracing::warn!(error = %error, "Export failed; recorded data remains exportable");
                self.ui(UiCommand::ExportFailed {
                    message: error.to_string(),
                });
            }
        }
    }

    fn export_buffer(&mut self) -> GazelogResult<u64> {
        let mut sink = self.export_target.create()?;
        write_samples(self.buffer.samples(), &mut sink)
    }

    fn wire_callbacks(&self, engine: &mut dyn GazeEngine) {
        let gaze_tx = self.events_tx.clone();
        engine.set_gaze_callback(Box::new(move |event| {
            let _ = gaze_tx.send(SessionEvent::Gaze(event));
        }));

        let progress_tx = self.events_tx.clone();
        let point_tx = self.events_tx.clone();
        let finished_tx = self.events_tx.clone();
        engine.set_calibration_callbacks(CalibrationCallbacks {
            on_progress: Box::new(move |progress| {
                let _ = progress_tx.send(SessionEvent::CalibrationProgress(progress));
            }),
            on_next_point: Box::new(move |x, y| {
                let _ = point_tx.send(SessionEvent::CalibrationNextPoint { x, y });
            }),
            on_finished: Box::new(move |result| {
                let _ = finished_tx.send(SessionEvent::CalibrationFinished(result));
            }),
        });
    }

    fn engine_mut(&mut self) -> Option<&mut (dyn GazeEngine + 'static)> {
        self.handle.as_mut().and_then(|handle| handle.engine_mut())
    }

    fn transition(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        tracing::info!(from = ?self.state, to = ?next, "Session state change");
        self.state = next;
        let _ = self.state_tx.send(next);
    }

    fn fail(&mut self, error: &GazelogError) {
        tracing::error!(error = %error, "Session failed");
        self.ui(UiCommand::SessionFailed {
            message: error.to_string(),
        });
        self.transition(SessionState::Failed);
        self.teardown();
    }

    fn teardown(&mut self) {
        self.buffer.close_window();
        self.calibration = None;
        if let Some(handle) = self.handle.as_mut() {
            if !handle.is_released() {
                if let Err(error) = handle.release() {
                    tracing::warn!(error = %error, "Engine release during teardown failed");
                }
            }
        }
    }

    fn into_report(self) -> SessionReport {
        SessionReport {
            final_state: self.state,
            started_wall: self.started_wall,
            samples: self.buffer.into_samples(),
            exports_completed: self.exports_completed,
        }
    }

    fn ui(&self, command: UiCommand) {
        let _ = self.ui_tx.send(command);
    }

    fn ignore(&self, event: &SessionEvent) {
        tracing::debug!(state = ?self.state, event = ?event, "Ignoring event in current state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_defaults() {
        let defaults = SessionDefaults {
            license_key: "dev_key".to_string(),
            settle_delay_ms: 250,
        };
        let config = SessionConfig::from_defaults(&defaults);
        assert_eq!(config.license_key, "dev_key");
        assert_eq!(config.settle_delay, Duration::from_millis(250));
        assert_eq!(config.calibration_mode, CalibrationMode::FivePoint);
        assert_eq!(config.accuracy, AccuracyCriteria::Default);
    }
}
