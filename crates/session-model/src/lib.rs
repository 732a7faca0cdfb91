//! GazeLog Session Model
//!
//! Data types shared by the session core and its collaborators:
//! - Raw gaze events stamped on the engine's monotonic clock
//! - Recorded samples expressed relative to the recording window
//! - Calibration session bookkeeping

pub mod calibration;
pub mod sample;

pub use calibration::*;
pub use sample::*;
