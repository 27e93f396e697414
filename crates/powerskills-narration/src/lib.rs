//! Power Skills — Narration & Presentation context.
//!
//! Owns the single process-wide narration resource: the arbitrator that keeps
//! at most one narration audible, the narrators that cooperate through it,
//! the playback interfaces the engine needs from the host, and the modal gate
//! that scopes narration to a dialog's visible lifetime.

pub mod arbitrator;
pub mod backend;
pub mod media;
pub mod modal;
pub mod narrator;

pub use arbitrator::{NarrationArbitrator, OwnerId, Registration, StopNotice};
pub use backend::{NarrationContent, NullSpeechBackend, PlaybackError, SpeechBackend};
pub use media::MediaPlayer;
pub use modal::{GateContent, ModalGate, Tone};
pub use narrator::{Narrator, NarratorState};
