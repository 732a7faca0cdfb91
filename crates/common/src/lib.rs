//! GazeLog Common Utilities
//!
//! Shared infrastructure for all GazeLog crates:
//! - Error types and result aliases
//! - Engine-clock conversion helpers
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
