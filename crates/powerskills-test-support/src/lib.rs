//! Shared test doubles and utilities for the Power Skills journey engine.

mod clock;
mod media;
mod speech;

pub use clock::{FixedClock, ManualClock};
pub use media::ScriptedMediaPlayer;
pub use speech::{RecordingSpeechBackend, SpeechCall};
