//! GazeLog Session Core
//!
//! Orchestrates a single-subject gaze recording session: engine
//! initialization, five-point calibration, live tracking with smoothing,
//! a playback-scoped recording buffer, and CSV export.
//!
//! # Architecture
//!
//! ```text
//! UI context          engine callback threads        settle timers
//!     │                        │                          │
//!     └──── SessionEvent ──────┴──────────────────────────┘
//!                              │
//!                              ▼
//!                   ┌─────────────────────┐
//!                   │    SessionDriver     │  single consumer,
//!                   │  (state machine +    │  validates state
//!                   │   owned components)  │  before acting
//!                   └──────────┬──────────┘
//!                              │
//!                          UiCommand ──► hosting UI context
//! ```
//!
//! Every engine callback, user command, and timer fire is routed as a
//! [`SessionEvent`] through one channel into the driver loop; nothing
//! mutates session state from a callback thread. UI-visible effects leave
//! the core as [`UiCommand`] messages.

pub mod buffer;
pub mod calibration;
pub mod events;
pub mod filter;
pub mod playback;
pub mod session;

pub use buffer::{RecordingBuffer, RecordingWindow};
pub use calibration::CalibrationCoordinator;
pub use events::{SessionEvent, UiCommand};
pub use filter::FilterAdapter;
pub use playback::VideoPlayer;
pub use session::{SessionClient, SessionConfig, SessionDriver, SessionReport, SessionState};
