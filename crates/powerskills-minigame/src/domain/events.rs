//! Domain events for the Mini-Game context.

use powerskills_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};

use super::input::PlayerInput;
use super::win_condition::Rejection;

/// Event type name for [`MiniGameEventKind::HelpDismissed`].
pub const HELP_DISMISSED: &str = "minigame.help_dismissed";
/// Event type name for [`MiniGameEventKind::InputAccepted`].
pub const INPUT_ACCEPTED: &str = "minigame.input_accepted";
/// Event type name for [`MiniGameEventKind::InputRejected`].
pub const INPUT_REJECTED: &str = "minigame.input_rejected";
/// Event type name for [`MiniGameEventKind::Won`].
pub const WON: &str = "minigame.won";
/// Event type name for [`MiniGameEventKind::ErrorAcknowledged`].
pub const ERROR_ACKNOWLEDGED: &str = "minigame.error_acknowledged";
/// Event type name for [`MiniGameEventKind::SuccessAcknowledged`].
pub const SUCCESS_ACKNOWLEDGED: &str = "minigame.success_acknowledged";

/// Emitted when the player closes the help dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelpDismissed {
    /// Definition key of the game.
    pub game: String,
}

/// Emitted when an input made progress without finishing the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputAccepted {
    /// Definition key of the game.
    pub game: String,
    /// The accepted input.
    pub input: PlayerInput,
}

/// Emitted when an input sent the game to the error phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRejected {
    /// Definition key of the game.
    pub game: String,
    /// The rejected input.
    pub input: PlayerInput,
    /// Why it was rejected.
    pub rejection: Rejection,
}

/// Emitted when an input satisfied the win condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Won {
    /// Definition key of the game.
    pub game: String,
    /// The winning input.
    pub input: PlayerInput,
}

/// Emitted when the player acknowledges the error dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorAcknowledged {
    /// Definition key of the game.
    pub game: String,
    /// Whether all accumulated progress was wiped.
    pub progress_cleared: bool,
}

/// Emitted once, when the player acknowledges the win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessAcknowledged {
    /// Definition key of the game.
    pub game: String,
}

/// Event payload variants for the Mini-Game context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MiniGameEventKind {
    /// Help dismissed; play begins.
    HelpDismissed(HelpDismissed),
    /// Progress recorded.
    InputAccepted(InputAccepted),
    /// Wrong input; error phase entered.
    InputRejected(InputRejected),
    /// Win condition holds; success phase entered.
    Won(Won),
    /// Error acknowledged; play resumes.
    ErrorAcknowledged(ErrorAcknowledged),
    /// Win acknowledged; the scene may advance.
    SuccessAcknowledged(SuccessAcknowledged),
}

impl MiniGameEventKind {
    /// The event type name of this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::HelpDismissed(_) => HELP_DISMISSED,
            Self::InputAccepted(_) => INPUT_ACCEPTED,
            Self::InputRejected(_) => INPUT_REJECTED,
            Self::Won(_) => WON,
            Self::ErrorAcknowledged(_) => ERROR_ACKNOWLEDGED,
            Self::SuccessAcknowledged(_) => SUCCESS_ACKNOWLEDGED,
        }
    }
}

/// Domain event envelope for the Mini-Game context.
#[derive(Debug, Clone)]
pub struct MiniGameEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: MiniGameEventKind,
}

impl DomainEvent for MiniGameEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("MiniGameEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
