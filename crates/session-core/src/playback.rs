//! Video playback collaborator.

use gazelog_common::error::GazelogResult;

/// The stimulus video player.
///
/// The core only starts playback; decoding and rendering belong to the
/// host, which reports the end of playback by sending
/// [`SessionEvent::PlaybackCompleted`](crate::SessionEvent::PlaybackCompleted).
pub trait VideoPlayer: Send {
    /// Begin playback of the stimulus video.
    fn start(&mut self) -> GazelogResult<()>;

    /// Player name for logging.
    fn name(&self) -> &str;
}
