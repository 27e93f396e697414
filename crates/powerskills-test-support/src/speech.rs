//! Recording speech backend — observes what narrators ask the host to do.

use std::sync::Mutex;

use powerskills_narration::{NarrationContent, OwnerId, PlaybackError, SpeechBackend};

/// One call made to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechCall {
    /// `start(owner, content)`.
    Start(OwnerId, NarrationContent),
    /// `stop(owner)`.
    Stop(OwnerId),
}

/// A speech backend that records every call and optionally refuses starts.
#[derive(Debug, Default)]
pub struct RecordingSpeechBackend {
    calls: Mutex<Vec<SpeechCall>>,
    refusal: Option<PlaybackError>,
}

impl RecordingSpeechBackend {
    /// A backend that accepts every start.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that behaves like a runtime blocking unattended audio.
    #[must_use]
    pub fn rejecting() -> Self {
        Self {
            refusal: Some(PlaybackError::Rejected("autoplay blocked".to_owned())),
            ..Self::default()
        }
    }

    /// A backend with no audio capability.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            refusal: Some(PlaybackError::Unavailable("no audio device".to_owned())),
            ..Self::default()
        }
    }

    /// Returns a snapshot of all calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<SpeechCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the content of every start call, in order.
    pub fn started(&self) -> Vec<NarrationContent> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SpeechCall::Start(_, content) => Some(content),
                SpeechCall::Stop(_) => None,
            })
            .collect()
    }

    /// Owners that started and have not been stopped since.
    pub fn audible(&self) -> Vec<OwnerId> {
        let mut audible = Vec::new();
        for call in self.calls() {
            match call {
                SpeechCall::Start(owner, _) if self.refusal.is_none() => {
                    audible.retain(|o| *o != owner);
                    audible.push(owner);
                }
                SpeechCall::Start(..) => {}
                SpeechCall::Stop(owner) => audible.retain(|o| *o != owner),
            }
        }
        audible
    }

    /// Forgets recorded calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl SpeechBackend for RecordingSpeechBackend {
    fn start(&self, owner: OwnerId, content: &NarrationContent) -> Result<(), PlaybackError> {
        self.calls
            .lock()
            .unwrap()
            .push(SpeechCall::Start(owner, content.clone()));
        match &self.refusal {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn stop(&self, owner: OwnerId) {
        self.calls.lock().unwrap().push(SpeechCall::Stop(owner));
    }
}
