//! Single-owner engine handle.

use gazelog_common::error::{GazelogError, GazelogResult};

use crate::GazeEngine;

/// Owner token for a live [`GazeEngine`].
///
/// Exactly one handle owns an engine. [`release`](EngineHandle::release)
/// stops tracking and drops the engine exactly once; afterwards the handle
/// stays around as a released sentinel. Accessing a released handle is a
/// guarded no-op: `engine_mut` returns `None` and logs, and a second
/// `release` is an error the caller can observe.
pub struct EngineHandle {
    engine: Option<Box<dyn GazeEngine>>,
}

impl EngineHandle {
    /// Take ownership of a live engine.
    pub fn new(engine: Box<dyn GazeEngine>) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    /// Whether the engine has been released.
    pub fn is_released(&self) -> bool {
        self.engine.is_none()
    }

    /// Access the live engine, or `None` after release.
    pub fn engine_mut(&mut self) -> Option<&mut (dyn GazeEngine + 'static)> {
        if self.engine.is_none() {
            tracing::error!("Operation attempted on released engine handle");
        }
        self.engine.as_deref_mut()
    }

    /// Stop tracking and release the engine.
    ///
    /// May be called exactly once; a second call reports the misuse
    /// instead of touching the engine again.
    pub fn release(&mut self) -> GazelogResult<()> {
        match self.engine.take() {
            Some(mut engine) => {
                tracing::info!(engine = engine.name(), "Releasing gaze engine");
                engine.stop_tracking()?;
                Ok(())
            }
            None => Err(GazelogError::engine("engine handle already released")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedEngine;

    #[test]
    fn test_release_stops_tracking_once() {
        let (engine, controller) = ScriptedEngine::new();
        let mut handle = EngineHandle::new(Box::new(engine));
        handle.engine_mut().unwrap().start_tracking().unwrap();
        assert!(controller.is_tracking());

        handle.release().unwrap();
        assert!(handle.is_released());
        assert!(!controller.is_tracking());
    }

    #[test]
    fn test_double_release_is_an_error() {
        let (engine, _controller) = ScriptedEngine::new();
        let mut handle = EngineHandle::new(Box::new(engine));
        handle.release().unwrap();
        assert!(handle.release().is_err());
    }

    #[test]
    fn test_released_handle_yields_no_engine() {
        let (engine, controller) = ScriptedEngine::new();
        let mut handle = EngineHandle::new(Box::new(engine));
        handle.release().unwrap();

        assert!(handle.engine_mut().is_none());
        // Guarded no-op: the released engine saw no further commands.
        assert!(!controller.is_tracking());
        assert_eq!(controller.collection_calls(), 0);
    }
}
