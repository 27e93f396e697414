//! Speech backend interface.
//!
//! The engine never decodes audio or synthesizes speech itself. The host
//! supplies a [`SpeechBackend`]; the engine only asks it to start or stop on
//! behalf of an owner.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arbitrator::OwnerId;

/// What a narrator says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NarrationContent {
    /// A pre-recorded audio file.
    Recorded {
        /// Source path or URL of the recording.
        src: String,
    },
    /// Text rendered by a speech synthesizer.
    Spoken {
        /// The text to speak.
        text: String,
        /// BCP 47 language tag.
        #[serde(default = "default_lang")]
        lang: String,
    },
}

impl NarrationContent {
    /// Spoken text in the default language.
    #[must_use]
    pub fn spoken(text: impl Into<String>) -> Self {
        Self::Spoken {
            text: text.into(),
            lang: default_lang(),
        }
    }

    /// A pre-recorded source.
    #[must_use]
    pub fn recorded(src: impl Into<String>) -> Self {
        Self::Recorded { src: src.into() }
    }

    /// Returns a copy with `{name}` placeholders in spoken text replaced.
    #[must_use]
    pub fn fill(&self, replacements: &[(&str, String)]) -> Self {
        match self {
            Self::Recorded { .. } => self.clone(),
            Self::Spoken { text, lang } => Self::Spoken {
                text: fill_placeholders(text, replacements),
                lang: lang.clone(),
            },
        }
    }
}

pub(crate) fn default_lang() -> String {
    "es-ES".to_owned()
}

/// Replaces every `{name}` occurrence with its value.
#[must_use]
pub fn fill_placeholders(template: &str, replacements: &[(&str, String)]) -> String {
    replacements
        .iter()
        .fold(template.to_owned(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
}

/// Why the host could not start playback.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaybackError {
    /// The runtime refused to start without a user gesture.
    #[error("playback rejected: {0}")]
    Rejected(String),

    /// No playback capability exists.
    #[error("playback unavailable: {0}")]
    Unavailable(String),
}

/// Host capability that plays narration.
pub trait SpeechBackend: Send + Sync {
    /// Starts `content` for `owner`.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Rejected` when an autoplay policy blocks the
    /// start and `PlaybackError::Unavailable` when there is no backend.
    fn start(&self, owner: OwnerId, content: &NarrationContent) -> Result<(), PlaybackError>;

    /// Stops whatever `owner` is playing. Stopping a silent owner is a no-op.
    fn stop(&self, owner: OwnerId);
}

/// Backend for hosts without any audio; every start reports `Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSpeechBackend;

impl SpeechBackend for NullSpeechBackend {
    fn start(&self, _owner: OwnerId, _content: &NarrationContent) -> Result<(), PlaybackError> {
        Err(PlaybackError::Unavailable("no speech backend configured".to_owned()))
    }

    fn stop(&self, _owner: OwnerId) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_replaces_named_placeholders() {
        let content = NarrationContent::spoken("“{label}” no corresponde. {hint}");

        let filled = content.fill(&[
            ("label", "Aislamiento".to_owned()),
            ("hint", "Intenta de nuevo.".to_owned()),
        ]);

        assert_eq!(
            filled,
            NarrationContent::spoken("“Aislamiento” no corresponde. Intenta de nuevo.")
        );
    }

    #[test]
    fn test_fill_leaves_recordings_untouched() {
        let content = NarrationContent::recorded("/audio/03-compass-help.mp3");

        assert_eq!(content.fill(&[("label", "x".to_owned())]), content);
    }

    #[test]
    fn test_spoken_content_deserializes_with_default_lang() {
        let content: NarrationContent =
            serde_json::from_str(r#"{"kind":"spoken","text":"Hola"}"#).unwrap();

        assert_eq!(content, NarrationContent::spoken("Hola"));
    }
}
