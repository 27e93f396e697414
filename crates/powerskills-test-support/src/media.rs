//! Scripted media player — intro video playback for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use powerskills_narration::{MediaPlayer, PlaybackError};

/// A media player that records what it was asked to play and can be told to
/// refuse autoplay.
#[derive(Debug, Default)]
pub struct ScriptedMediaPlayer {
    played: Mutex<Vec<String>>,
    pauses: Mutex<usize>,
    refuse_autoplay: Mutex<bool>,
}

impl ScriptedMediaPlayer {
    /// A player that starts every source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A player whose starts are rejected until `allow_autoplay` is called.
    #[must_use]
    pub fn blocking() -> Self {
        Self {
            refuse_autoplay: Mutex::new(true),
            ..Self::default()
        }
    }

    /// Lets subsequent starts succeed (the user interacted with the page).
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn allow_autoplay(&self) {
        *self.refuse_autoplay.lock().unwrap() = false;
    }

    /// Sources passed to `play`, including refused ones.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }

    /// Number of `pause` calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn pauses(&self) -> usize {
        *self.pauses.lock().unwrap()
    }
}

#[async_trait]
impl MediaPlayer for ScriptedMediaPlayer {
    async fn play(&self, src: &str) -> Result<(), PlaybackError> {
        self.played.lock().unwrap().push(src.to_owned());
        if *self.refuse_autoplay.lock().unwrap() {
            Err(PlaybackError::Rejected("autoplay blocked".to_owned()))
        } else {
            Ok(())
        }
    }

    fn pause(&self) {
        *self.pauses.lock().unwrap() += 1;
    }
}
