//! Static configuration of one mini-game.

use powerskills_narration::{GateContent, NarrationContent, Tone};
use serde::{Deserialize, Serialize};

use super::input::OptionId;
use super::win_condition::WinCondition;

fn default_cue_lang() -> String {
    "es-ES".to_owned()
}

/// A mini-game as written in the journey configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiniGameDefinition {
    /// Unique key, used in logs and events.
    pub key: String,
    /// Title shown above the play area.
    pub title: String,
    /// The win condition the state machine is parameterized with.
    pub condition: WinCondition,
    /// Help dialog. Without one, play begins on mount.
    #[serde(default)]
    pub help: Option<GateContent>,
    /// Error dialog template (`{label}`, `{hint}`, `{score}`, `{needed}`).
    #[serde(default)]
    pub error: Option<GateContent>,
    /// Success dialog. Without one, the game advances on its own.
    #[serde(default)]
    pub success: Option<GateContent>,
    /// Delay between the winning input and the success dialog.
    #[serde(default)]
    pub success_delay_ms: u64,
    /// Language of option cue narration.
    #[serde(default = "default_cue_lang")]
    pub cue_lang: String,
}

impl MiniGameDefinition {
    /// Checks the definition is playable.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem, prefixed with the key.
    pub fn validate(&self) -> Result<(), String> {
        if self.key.trim().is_empty() {
            return Err("mini-game key is empty".to_owned());
        }
        self.condition
            .validate()
            .map_err(|e| format!("mini-game `{}`: {e}", self.key))
    }

    /// The error dialog, or a generic retry dialog.
    #[must_use]
    pub fn error_gate(&self) -> GateContent {
        self.error.clone().unwrap_or_else(|| GateContent {
            tone: Tone::Warning,
            title: "Casi…".to_owned(),
            body: "Inténtalo de nuevo.".to_owned(),
            primary_label: "Reintentar".to_owned(),
            narration: None,
        })
    }

    /// Cue narration for an option, if it has one.
    #[must_use]
    pub fn cue(&self, option: &OptionId) -> Option<NarrationContent> {
        let cue = self.condition.option(option)?.cue.as_ref()?;
        Some(NarrationContent::Spoken {
            text: cue.clone(),
            lang: self.cue_lang.clone(),
        })
    }
}
