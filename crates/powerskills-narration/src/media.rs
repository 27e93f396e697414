//! Intro media playback interface.

use async_trait::async_trait;

use crate::backend::PlaybackError;

/// Host capability that plays a scene's intro video.
///
/// The "ended" event is delivered by the host calling back into the scene
/// sequencer; this trait only covers starting and pausing.
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Starts playing `src`. Resolves once the runtime accepted or refused.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Rejected` when autoplay is blocked.
    async fn play(&self, src: &str) -> Result<(), PlaybackError>;

    /// Pauses the current media, if any.
    fn pause(&self);
}
