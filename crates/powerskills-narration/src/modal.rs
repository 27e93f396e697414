//! Modal gate — a blocking dialog with one primary acknowledgement.
//!
//! A gate may embed narration. The narration plays for exactly as long as the
//! gate is open: it starts on the closed→open transition and stops on the
//! open→closed transition or when the gate is dropped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::{NarrationContent, fill_placeholders};
use crate::narrator::{Narrator, NarratorState};

/// Visual tone of a gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Instructions and briefings.
    #[default]
    Info,
    /// Success acknowledgement.
    Success,
    /// Recoverable mistake.
    Warning,
}

/// Configured content of a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateContent {
    /// Dialog tone.
    #[serde(default)]
    pub tone: Tone,
    /// Dialog title.
    pub title: String,
    /// Body text (markdown).
    #[serde(default)]
    pub body: String,
    /// Label of the primary action.
    #[serde(default = "default_primary_label")]
    pub primary_label: String,
    /// Narration that accompanies the open dialog.
    #[serde(default)]
    pub narration: Option<NarrationContent>,
}

fn default_primary_label() -> String {
    "Continuar".to_owned()
}

impl GateContent {
    /// Returns a copy with `{name}` placeholders replaced in body and narration.
    #[must_use]
    pub fn fill(&self, replacements: &[(&str, String)]) -> Self {
        Self {
            tone: self.tone,
            title: fill_placeholders(&self.title, replacements),
            body: fill_placeholders(&self.body, replacements),
            primary_label: self.primary_label.clone(),
            narration: self.narration.as_ref().map(|n| n.fill(replacements)),
        }
    }
}

/// A dialog instance with its own narrator.
#[derive(Debug)]
pub struct ModalGate {
    content: GateContent,
    narrator: Narrator,
    open: bool,
}

impl ModalGate {
    /// Creates a closed gate.
    #[must_use]
    pub fn new(content: GateContent, narrator: Narrator) -> Self {
        Self {
            content,
            narrator,
            open: false,
        }
    }

    /// Drives the `open` input. Only transitions have effects.
    pub fn set_open(&mut self, open: bool) {
        if open == self.open {
            return;
        }
        self.open = open;
        if open {
            debug!(title = %self.content.title, tone = ?self.content.tone, "gate opened");
            if let Some(narration) = self.content.narration.clone() {
                self.narrator.play(&narration);
            }
        } else {
            debug!(title = %self.content.title, "gate closed");
            self.narrator.stop();
        }
    }

    /// Replaces the content. Takes effect on the next open transition.
    pub fn set_content(&mut self, content: GateContent) {
        self.content = content;
    }

    /// The primary action. Returns `true` if it was pressed on an open gate.
    ///
    /// The gate stays open; its owner closes it by changing state.
    #[must_use]
    pub fn acknowledge(&self) -> bool {
        self.open
    }

    /// Whether the gate is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The gate's content.
    #[must_use]
    pub fn content(&self) -> &GateContent {
        &self.content
    }

    /// State of the embedded narration.
    #[must_use]
    pub fn narration_state(&self) -> NarratorState {
        self.narrator.state()
    }

    /// Manual trigger for narration the runtime refused to autoplay.
    pub fn replay_narration(&mut self) -> NarratorState {
        if self.open {
            self.narrator.play_on_gesture()
        } else {
            self.narrator.state()
        }
    }

    /// The gate's narrator (for routing host "ended" callbacks).
    pub fn narrator_mut(&mut self) -> &mut Narrator {
        &mut self.narrator
    }
}
