//! Terminal playback backends.
//!
//! Narration and intro videos are "played" by printing a line to a shared
//! transcript. With autoplay off, both refuse to start until the player makes
//! a gesture, which is how a browser treats unattended audio.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use powerskills_narration::{
    MediaPlayer, NarrationContent, OwnerId, PlaybackError, SpeechBackend,
};
use tracing::debug;

/// Lines produced by playback since the last drain, plus the narrations
/// those lines finished.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Arc<Mutex<Vec<String>>>,
    finished: Arc<Mutex<Vec<OwnerId>>>,
}

impl Transcript {
    /// Appends a line.
    pub fn push(&self, line: impl Into<String>) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.into());
    }

    /// Takes every line pushed so far.
    #[must_use]
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Printed narration is over as soon as it is on screen.
    fn finish(&self, owner: OwnerId) {
        self.finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(owner);
    }

    fn forget(&self, owner: OwnerId) {
        self.finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|o| *o != owner);
    }

    /// Takes the owners whose narration ended since the last call.
    #[must_use]
    pub fn take_finished(&self) -> Vec<OwnerId> {
        std::mem::take(&mut *self.finished.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Whether the player has made the gesture that unlocks playback.
#[derive(Debug, Clone)]
pub struct Gesture {
    unlocked: Arc<AtomicBool>,
}

impl Gesture {
    /// Starts unlocked when `autoplay` is allowed.
    #[must_use]
    pub fn new(autoplay: bool) -> Self {
        Self {
            unlocked: Arc::new(AtomicBool::new(autoplay)),
        }
    }

    /// Records the gesture.
    pub fn unlock(&self) {
        if !self.unlocked.swap(true, Ordering::SeqCst) {
            debug!("playback unlocked by gesture");
        }
    }

    /// Whether playback may start.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), PlaybackError> {
        if self.is_unlocked() {
            Ok(())
        } else {
            Err(PlaybackError::Rejected(
                "playback needs a gesture; type `play`".to_owned(),
            ))
        }
    }
}

/// Prints narration to the transcript.
#[derive(Debug)]
pub struct TerminalSpeechBackend {
    transcript: Transcript,
    gesture: Gesture,
}

impl TerminalSpeechBackend {
    /// Creates a backend writing to `transcript`.
    #[must_use]
    pub fn new(transcript: Transcript, gesture: Gesture) -> Self {
        Self {
            transcript,
            gesture,
        }
    }
}

impl SpeechBackend for TerminalSpeechBackend {
    fn start(&self, owner: OwnerId, content: &NarrationContent) -> Result<(), PlaybackError> {
        self.gesture.check()?;
        debug!(%owner, "narration started");
        match content {
            NarrationContent::Spoken { text, .. } => self.transcript.push(format!("🔊 {text}")),
            NarrationContent::Recorded { src } => {
                self.transcript.push(format!("🔊 [audio] {src}"));
            }
        }
        self.transcript.finish(owner);
        Ok(())
    }

    fn stop(&self, owner: OwnerId) {
        self.transcript.forget(owner);
        debug!(%owner, "narration stopped");
    }
}

/// Prints intro videos to the transcript.
#[derive(Debug)]
pub struct TerminalMediaPlayer {
    transcript: Transcript,
    gesture: Gesture,
}

impl TerminalMediaPlayer {
    /// Creates a player writing to `transcript`.
    #[must_use]
    pub fn new(transcript: Transcript, gesture: Gesture) -> Self {
        Self {
            transcript,
            gesture,
        }
    }
}

#[async_trait]
impl MediaPlayer for TerminalMediaPlayer {
    async fn play(&self, src: &str) -> Result<(), PlaybackError> {
        self.gesture.check()?;
        self.transcript.push(format!("🎬 {src}"));
        Ok(())
    }

    fn pause(&self) {
        self.transcript.push("⏸");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spoken_narration_is_printed() {
        let transcript = Transcript::default();
        let speech = TerminalSpeechBackend::new(transcript.clone(), Gesture::new(true));

        speech
            .start(OwnerId::new(), &NarrationContent::spoken("Hola"))
            .unwrap();

        assert_eq!(transcript.drain(), vec!["🔊 Hola".to_owned()]);
        assert!(transcript.drain().is_empty());
    }

    #[test]
    fn test_printed_narration_is_reported_finished_unless_stopped() {
        // Arrange
        let transcript = Transcript::default();
        let speech = TerminalSpeechBackend::new(transcript.clone(), Gesture::new(true));
        let (kept, stopped) = (OwnerId::new(), OwnerId::new());

        // Act
        speech.start(kept, &NarrationContent::spoken("Hola")).unwrap();
        speech.start(stopped, &NarrationContent::spoken("Adiós")).unwrap();
        speech.stop(stopped);

        // Assert
        assert_eq!(transcript.take_finished(), vec![kept]);
        assert!(transcript.take_finished().is_empty());
    }

    #[test]
    fn test_locked_speech_is_rejected_until_gesture() {
        // Arrange
        let transcript = Transcript::default();
        let gesture = Gesture::new(false);
        let speech = TerminalSpeechBackend::new(transcript.clone(), gesture.clone());
        let content = NarrationContent::recorded("/audio/02-intro.mp3");

        // Act
        let before = speech.start(OwnerId::new(), &content);
        gesture.unlock();
        let after = speech.start(OwnerId::new(), &content);

        // Assert
        assert!(matches!(before, Err(PlaybackError::Rejected(_))));
        assert!(after.is_ok());
        assert_eq!(transcript.drain(), vec!["🔊 [audio] /audio/02-intro.mp3".to_owned()]);
    }

    #[tokio::test]
    async fn test_media_player_shares_the_gesture() {
        let transcript = Transcript::default();
        let gesture = Gesture::new(false);
        let player = TerminalMediaPlayer::new(transcript.clone(), gesture.clone());

        let blocked = player.play("/videos/01-bienvenida.mp4").await;
        gesture.unlock();
        player.play("/videos/01-bienvenida.mp4").await.unwrap();
        player.pause();

        assert!(blocked.is_err());
        assert_eq!(
            transcript.drain(),
            vec!["🎬 /videos/01-bienvenida.mp4".to_owned(), "⏸".to_owned()]
        );
    }
}
