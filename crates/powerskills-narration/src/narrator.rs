//! Narrator — one narration-capable component.
//!
//! A `Narrator` owns its registration with the arbitrator for as long as it
//! lives. Dropping it stops its playback and unregisters it, so narration
//! never outlives the phase, dialog or scene that created it.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, warn};

use crate::arbitrator::{NarrationArbitrator, OwnerId, Registration};
use crate::backend::{NarrationContent, PlaybackError, SpeechBackend};

/// Playback state of a single narrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarratorState {
    /// Nothing playing.
    Idle,
    /// The backend accepted the content and is playing it.
    Playing,
    /// The runtime refused to start; a manual trigger must be offered.
    AwaitingGesture,
    /// No backend is available; the narration is skipped silently.
    Muted,
}

/// A cooperating writer of the shared narration resource.
pub struct Narrator {
    id: OwnerId,
    arbitrator: NarrationArbitrator,
    backend: Arc<dyn SpeechBackend>,
    state: Arc<Mutex<NarratorState>>,
    pending: Option<NarrationContent>,
    _registration: Registration,
}

impl std::fmt::Debug for Narrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Narrator")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Narrator {
    /// Creates a narrator and registers it with `arbitrator`.
    #[must_use]
    pub fn new(arbitrator: &NarrationArbitrator, backend: Arc<dyn SpeechBackend>) -> Self {
        let id = OwnerId::new();
        let state = Arc::new(Mutex::new(NarratorState::Idle));

        let listener_state = Arc::clone(&state);
        let listener_backend = Arc::clone(&backend);
        let registration = arbitrator.register(id, move |notice| {
            if notice.except == id {
                return;
            }
            // Blocked narration keeps its manual trigger.
            let mut state = listener_state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state == NarratorState::Playing {
                listener_backend.stop(id);
                *state = NarratorState::Idle;
                debug!(owner = %id, superseded_by = %notice.except, "narration superseded");
            }
        });

        Self {
            id,
            arbitrator: arbitrator.clone(),
            backend,
            state,
            pending: None,
            _registration: registration,
        }
    }

    /// This narrator's owner id.
    #[must_use]
    pub fn id(&self) -> OwnerId {
        self.id
    }

    /// Current playback state.
    #[must_use]
    pub fn state(&self) -> NarratorState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: NarratorState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Takes ownership of the narration resource and starts `content`.
    ///
    /// Everyone else is silenced before the backend is asked to start.
    pub fn play(&mut self, content: &NarrationContent) -> NarratorState {
        if self.state() == NarratorState::Playing {
            self.backend.stop(self.id);
        }
        self.arbitrator.activate(self.id);

        let next = match self.backend.start(self.id, content) {
            Ok(()) => {
                self.pending = None;
                NarratorState::Playing
            }
            Err(PlaybackError::Rejected(reason)) => {
                warn!(owner = %self.id, %reason, "narration blocked, waiting for user gesture");
                self.pending = Some(content.clone());
                self.arbitrator.release(self.id);
                NarratorState::AwaitingGesture
            }
            Err(PlaybackError::Unavailable(reason)) => {
                warn!(owner = %self.id, %reason, "narration unavailable, continuing silently");
                self.pending = None;
                self.arbitrator.release(self.id);
                NarratorState::Muted
            }
        };
        self.set_state(next);
        next
    }

    /// Manual trigger: retries narration that the runtime refused to start.
    pub fn play_on_gesture(&mut self) -> NarratorState {
        match self.pending.take() {
            Some(content) => self.play(&content),
            None => self.state(),
        }
    }

    /// Stops playback and gives up ownership.
    pub fn stop(&mut self) {
        if self.state() == NarratorState::Playing {
            self.backend.stop(self.id);
        }
        self.pending = None;
        self.set_state(NarratorState::Idle);
        self.arbitrator.release(self.id);
    }

    /// Called by the host when playback reached its end.
    pub fn on_ended(&mut self) {
        if self.state() == NarratorState::Playing {
            self.set_state(NarratorState::Idle);
            self.arbitrator.release(self.id);
        }
    }
}

impl Drop for Narrator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Backend double that records calls and can refuse starts.
    #[derive(Debug, Default)]
    pub(crate) struct Recorder {
        pub(crate) calls: Mutex<Vec<String>>,
        pub(crate) refuse: Option<PlaybackError>,
    }

    impl SpeechBackend for Recorder {
        fn start(&self, owner: OwnerId, _content: &NarrationContent) -> Result<(), PlaybackError> {
            self.calls.lock().unwrap().push(format!("start {owner}"));
            match &self.refuse {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn stop(&self, owner: OwnerId) {
            self.calls.lock().unwrap().push(format!("stop {owner}"));
        }
    }

    fn content() -> NarrationContent {
        NarrationContent::spoken("Bienvenida")
    }

    #[test]
    fn test_play_then_supersede_stops_previous_narrator() {
        // Arrange
        let arbitrator = NarrationArbitrator::new();
        let backend = Arc::new(Recorder::default());
        let mut first = Narrator::new(&arbitrator, backend.clone());
        let mut second = Narrator::new(&arbitrator, backend.clone());
        first.play(&content());

        // Act
        second.play(&content());

        // Assert
        assert_eq!(first.state(), NarratorState::Idle);
        assert_eq!(second.state(), NarratorState::Playing);
        assert_eq!(arbitrator.active(), Some(second.id()));
        let calls = backend.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                format!("start {}", first.id()),
                format!("stop {}", first.id()),
                format!("start {}", second.id()),
            ]
        );
    }

    #[test]
    fn test_rejected_start_waits_for_gesture_and_retries() {
        // Arrange
        let arbitrator = NarrationArbitrator::new();
        let backend = Arc::new(Recorder {
            refuse: Some(PlaybackError::Rejected("autoplay".to_owned())),
            ..Recorder::default()
        });
        let mut narrator = Narrator::new(&arbitrator, backend.clone());

        // Act
        let state = narrator.play(&content());
        let retried = narrator.play_on_gesture();

        // Assert
        assert_eq!(state, NarratorState::AwaitingGesture);
        assert_eq!(retried, NarratorState::AwaitingGesture);
        assert_eq!(backend.calls.lock().unwrap().len(), 2);
        assert_eq!(arbitrator.active(), None);
    }

    #[test]
    fn test_blocked_narrator_keeps_manual_trigger_when_another_plays() {
        // Arrange
        let arbitrator = NarrationArbitrator::new();
        let locked = Arc::new(Recorder {
            refuse: Some(PlaybackError::Rejected("autoplay".to_owned())),
            ..Recorder::default()
        });
        let mut blocked = Narrator::new(&arbitrator, locked);
        let mut other = Narrator::new(&arbitrator, Arc::new(Recorder::default()));
        blocked.play(&content());

        // Act
        other.play(&content());

        // Assert
        assert_eq!(blocked.state(), NarratorState::AwaitingGesture);
        assert_eq!(other.state(), NarratorState::Playing);
        assert!(blocked.pending.is_some());
    }

    #[test]
    fn test_unavailable_backend_degrades_to_muted() {
        let arbitrator = NarrationArbitrator::new();
        let backend = Arc::new(Recorder {
            refuse: Some(PlaybackError::Unavailable("none".to_owned())),
            ..Recorder::default()
        });
        let mut narrator = Narrator::new(&arbitrator, backend);

        assert_eq!(narrator.play(&content()), NarratorState::Muted);
        assert_eq!(narrator.play_on_gesture(), NarratorState::Muted);
    }

    #[test]
    fn test_drop_stops_playback_and_unregisters() {
        // Arrange
        let arbitrator = NarrationArbitrator::new();
        let backend = Arc::new(Recorder::default());
        let mut narrator = Narrator::new(&arbitrator, backend.clone());
        let id = narrator.id();
        narrator.play(&content());

        // Act
        drop(narrator);

        // Assert
        assert_eq!(arbitrator.registered_count(), 0);
        assert_eq!(arbitrator.active(), None);
        assert_eq!(
            backend.calls.lock().unwrap().last().cloned(),
            Some(format!("stop {id}"))
        );
    }

    #[test]
    fn test_on_ended_releases_ownership() {
        let arbitrator = NarrationArbitrator::new();
        let mut narrator = Narrator::new(&arbitrator, Arc::new(Recorder::default()));
        narrator.play(&content());

        narrator.on_ended();

        assert_eq!(narrator.state(), NarratorState::Idle);
        assert_eq!(arbitrator.active(), None);
    }
}
