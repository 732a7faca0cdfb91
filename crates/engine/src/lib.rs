//! GazeLog Engine Boundary
//!
//! The gaze-estimation engine is an external collaborator: it owns the
//! camera, the estimation algorithm, and the calibration protocol, and
//! reports back through callbacks on threads it controls. This crate
//! defines the surface the session core consumes:
//!
//! - [`GazeEngine`] — the live engine: callback registration, tracking
//!   and calibration commands
//! - [`EngineProvider`] — asynchronous initialization, classified into
//!   [`EngineInitError`] kinds on failure
//! - [`EngineHandle`] — single-owner token around a live engine with an
//!   explicit released sentinel
//! - [`OneEuroFilterBank`] — the engine-supplied smoothing filter,
//!   consumed through its admit/read contract
//! - [`scripted`] — a fully scriptable engine for tests and hardware-free
//!   hosts

pub mod filter;
pub mod handle;
pub mod scripted;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use gazelog_common::error::{GazelogError, GazelogResult};
use gazelog_session_model::RawGazeEvent;

pub use filter::OneEuroFilterBank;
pub use handle::EngineHandle;

/// Classified engine initialization failure.
///
/// All kinds are fatal for the current session; recovery requires a full
/// restart with a fresh engine handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineInitError {
    #[error("engine initialization failed")]
    EngineInit,

    #[error("required capture permission not granted")]
    Permission,

    #[error("unknown engine initialization failure")]
    Unknown,
}

impl From<EngineInitError> for GazelogError {
    fn from(error: EngineInitError) -> Self {
        match error {
            EngineInitError::Permission => GazelogError::permission_denied(error.to_string()),
            EngineInitError::EngineInit | EngineInitError::Unknown => {
                GazelogError::engine(error.to_string())
            }
        }
    }
}

/// Calibration protocol selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationMode {
    /// Single-target quick calibration.
    OnePoint,
    /// Standard five-target protocol.
    #[default]
    FivePoint,
}

/// Accuracy target for calibration sample collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyCriteria {
    #[default]
    Default,
    Low,
    High,
}

/// Callback invoked for every raw gaze estimate.
///
/// Runs on a thread the engine owns; implementations must hand off work
/// rather than block.
pub type GazeCallback = Box<dyn Fn(RawGazeEvent) + Send + Sync>;

/// Callbacks for the calibration lifecycle.
pub struct CalibrationCallbacks {
    /// Per-point collection progress in `[0, 1]`, forwarded verbatim.
    pub on_progress: Box<dyn Fn(f32) + Send + Sync>,

    /// The engine wants the subject looking at a new target.
    pub on_next_point: Box<dyn Fn(f32, f32) + Send + Sync>,

    /// Calibration completed; the payload is the engine's result vector.
    pub on_finished: Box<dyn Fn(Vec<f64>) + Send + Sync>,
}

/// A live gaze engine.
///
/// Obtained from an [`EngineProvider`]; owned by exactly one
/// [`EngineHandle`] until released.
pub trait GazeEngine: Send {
    /// Register the raw gaze callback, replacing any previous one.
    fn set_gaze_callback(&mut self, callback: GazeCallback);

    /// Register the calibration callbacks, replacing any previous set.
    fn set_calibration_callbacks(&mut self, callbacks: CalibrationCallbacks);

    /// Begin streaming gaze estimates.
    fn start_tracking(&mut self) -> GazelogResult<()>;

    /// Stop streaming gaze estimates.
    fn stop_tracking(&mut self) -> GazelogResult<()>;

    /// Start the calibration protocol.
    fn start_calibration(
        &mut self,
        mode: CalibrationMode,
        accuracy: AccuracyCriteria,
    ) -> GazelogResult<()>;

    /// Whether a calibration is currently in flight.
    fn is_calibrating(&self) -> bool;

    /// Ask the engine to collect samples for the current target.
    ///
    /// Returns whether the engine accepted the request.
    fn begin_sample_collection(&mut self) -> bool;

    /// Engine name for logging.
    fn name(&self) -> &str;
}

/// Asynchronous engine initialization.
#[async_trait]
pub trait EngineProvider: Send + Sync {
    /// Initialize the engine with the given license key.
    ///
    /// Resolves to a live engine or a classified failure. The caller is
    /// responsible for wrapping the engine in an [`EngineHandle`].
    async fn initialize(&self, license_key: &str) -> Result<Box<dyn GazeEngine>, EngineInitError>;
}
