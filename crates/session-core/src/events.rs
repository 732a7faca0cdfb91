//! Session event and UI command types.
//!
//! Engine callbacks run on threads the engine owns and the hosting UI has
//! its own context; neither may touch session state directly. Everything
//! funnels through [`SessionEvent`] into the driver loop, and every
//! visible effect leaves as a [`UiCommand`] for the host to execute.

use gazelog_session_model::RawGazeEvent;

/// An event routed into the session driver.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    // User interaction
    /// Host activity started; begin the permission/initialization flow.
    Start,
    /// Capture-device permission granted.
    PermissionGranted,
    /// Capture-device permission denied.
    PermissionDenied,
    /// User asked to calibrate.
    StartCalibration,
    /// User started video playback.
    StartPlayback,
    /// User confirmed export of the recorded buffer.
    RequestExport,
    /// Host is tearing the session down.
    Shutdown,

    // Engine callbacks
    /// Raw gaze estimate from the engine.
    Gaze(RawGazeEvent),
    /// The engine wants the subject looking at a new calibration target.
    CalibrationNextPoint { x: f32, y: f32 },
    /// Per-point collection progress in `[0, 1]`.
    CalibrationProgress(f32),
    /// Calibration completed with the engine's result vector.
    CalibrationFinished(Vec<f64>),

    // Background worker
    /// The settle delay for the current calibration target elapsed.
    SettleElapsed,

    // Playback collaborator
    /// Video playback reached its end.
    PlaybackCompleted,
}

/// A UI effect marshaled out of the core.
///
/// Commands are semantic; the host maps them onto its widgets.
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    /// Engine is ready; reveal the calibration control.
    ShowCalibrationControl,
    HideCalibrationControl,

    ShowCalibrationOverlay,
    HideCalibrationOverlay,
    /// Reposition the calibration marker.
    MoveCalibrationPoint { x: f32, y: f32 },
    /// Animate the marker with the engine-reported progress, verbatim.
    SetCalibrationProgress(f32),

    ShowPlaybackControl,
    HidePlaybackControl,
    ShowVideoSurface,
    HideVideoSurface,

    /// Recording finished; reveal the export control.
    ShowExportControl,
    ExportCompleted { rows: u64 },
    ExportFailed { message: String },

    /// The session hit a fatal failure and requires a full restart.
    SessionFailed { message: String },
}
