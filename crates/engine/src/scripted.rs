//! Scripted engine for tests and hardware-free hosts.
//!
//! Implements the full [`GazeEngine`] surface with no camera behind it.
//! A [`ScriptedController`] shares state with the engine after it has
//! been boxed and handed to a session, so tests can emit gaze and
//! calibration callbacks and observe which commands the session issued.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use gazelog_common::error::GazelogResult;
use gazelog_session_model::RawGazeEvent;

use crate::{
    AccuracyCriteria, CalibrationCallbacks, CalibrationMode, EngineInitError, EngineProvider,
    GazeCallback, GazeEngine,
};

#[derive(Default)]
struct Shared {
    gaze_callback: Option<GazeCallback>,
    calibration_callbacks: Option<CalibrationCallbacks>,
    tracking: bool,
    calibrating: bool,
    calibration_mode: Option<CalibrationMode>,
    accuracy: Option<AccuracyCriteria>,
    collection_calls: usize,
    last_collection_accepted: Option<bool>,
}

/// A [`GazeEngine`] whose callbacks are driven from a test.
pub struct ScriptedEngine {
    shared: Arc<Mutex<Shared>>,
}

/// Shared-state handle for driving and observing a [`ScriptedEngine`].
#[derive(Clone)]
pub struct ScriptedController {
    shared: Arc<Mutex<Shared>>,
}

impl ScriptedEngine {
    /// Create an engine plus the controller that scripts it.
    pub fn new() -> (Self, ScriptedController) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            Self {
                shared: shared.clone(),
            },
            ScriptedController { shared },
        )
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().expect("scripted engine state poisoned")
    }
}

impl GazeEngine for ScriptedEngine {
    fn set_gaze_callback(&mut self, callback: GazeCallback) {
        self.lock().gaze_callback = Some(callback);
    }

    fn set_calibration_callbacks(&mut self, callbacks: CalibrationCallbacks) {
        self.lock().calibration_callbacks = Some(callbacks);
    }

    fn start_tracking(&mut self) -> GazelogResult<()> {
        self.lock().tracking = true;
        Ok(())
    }

    fn stop_tracking(&mut self) -> GazelogResult<()> {
        let mut shared = self.lock();
        shared.tracking = false;
        shared.calibrating = false;
        Ok(())
    }

    fn start_calibration(
        &mut self,
        mode: CalibrationMode,
        accuracy: AccuracyCriteria,
    ) -> GazelogResult<()> {
        let mut shared = self.lock();
        shared.calibrating = true;
        shared.calibration_mode = Some(mode);
        shared.accuracy = Some(accuracy);
        Ok(())
    }

    fn is_calibrating(&self) -> bool {
        self.lock().calibrating
    }

    fn begin_sample_collection(&mut self) -> bool {
        let mut shared = self.lock();
        shared.collection_calls += 1;
        let accepted = shared.calibrating;
        shared.last_collection_accepted = Some(accepted);
        accepted
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

impl ScriptedController {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().expect("scripted engine state poisoned")
    }

    /// Deliver a raw gaze estimate through the registered callback.
    pub fn emit_gaze(&self, timestamp_ms: u64, x: f32, y: f32) {
        let shared = self.lock();
        if let Some(callback) = &shared.gaze_callback {
            callback(RawGazeEvent::new(timestamp_ms, x, y));
        }
    }

    /// Deliver a calibration next-point callback.
    pub fn emit_next_point(&self, x: f32, y: f32) {
        let shared = self.lock();
        if let Some(callbacks) = &shared.calibration_callbacks {
            (callbacks.on_next_point)(x, y);
        }
    }

    /// Deliver a calibration progress callback.
    pub fn emit_progress(&self, progress: f32) {
        let shared = self.lock();
        if let Some(callbacks) = &shared.calibration_callbacks {
            (callbacks.on_progress)(progress);
        }
    }

    /// End calibration and deliver the finished callback.
    pub fn emit_finished(&self, result: Vec<f64>) {
        let mut shared = self.lock();
        shared.calibrating = false;
        if let Some(callbacks) = &shared.calibration_callbacks {
            (callbacks.on_finished)(result);
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.lock().tracking
    }

    pub fn is_calibrating(&self) -> bool {
        self.lock().calibrating
    }

    /// Mode the session requested, if calibration was started.
    pub fn calibration_mode(&self) -> Option<CalibrationMode> {
        self.lock().calibration_mode
    }

    /// How many times the session asked for sample collection.
    pub fn collection_calls(&self) -> usize {
        self.lock().collection_calls
    }

    /// Result of the most recent collection request.
    pub fn last_collection_accepted(&self) -> Option<bool> {
        self.lock().last_collection_accepted
    }
}

/// Provider yielding one scripted engine, or a scripted failure.
pub struct ScriptedProvider {
    engine: Mutex<Option<Result<ScriptedEngine, EngineInitError>>>,
}

impl ScriptedProvider {
    /// Provider that initializes successfully exactly once.
    pub fn new() -> (Self, ScriptedController) {
        let (engine, controller) = ScriptedEngine::new();
        (
            Self {
                engine: Mutex::new(Some(Ok(engine))),
            },
            controller,
        )
    }

    /// Provider whose initialization fails with the given kind.
    pub fn failing(error: EngineInitError) -> Self {
        Self {
            engine: Mutex::new(Some(Err(error))),
        }
    }
}

#[async_trait]
impl EngineProvider for ScriptedProvider {
    async fn initialize(
        &self,
        _license_key: &str,
    ) -> Result<Box<dyn GazeEngine>, EngineInitError> {
        let slot = self
            .engine
            .lock()
            .expect("scripted provider state poisoned")
            .take();
        match slot {
            Some(Ok(engine)) => Ok(Box::new(engine)),
            Some(Err(error)) => Err(error),
            // A second initialization against the same provider: the one
            // engine has already been handed out.
            None => Err(EngineInitError::EngineInit),
        }
    }
}
