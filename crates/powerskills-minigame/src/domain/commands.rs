//! Commands for the Mini-Game context.

use powerskills_core::command::Command;
use uuid::Uuid;

use super::input::PlayerInput;

/// Command to close the help dialog and start playing.
#[derive(Debug, Clone)]
pub struct DismissHelp {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The mini-game instance.
    pub game_id: Uuid,
}

/// Command to evaluate one player input.
#[derive(Debug, Clone)]
pub struct SubmitInput {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The mini-game instance.
    pub game_id: Uuid,
    /// The input.
    pub input: PlayerInput,
}

/// Command to acknowledge the error dialog.
#[derive(Debug, Clone)]
pub struct AcknowledgeError {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The mini-game instance.
    pub game_id: Uuid,
}

/// Command to acknowledge the win.
#[derive(Debug, Clone)]
pub struct AcknowledgeSuccess {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The mini-game instance.
    pub game_id: Uuid,
}

impl Command for DismissHelp {
    fn command_type(&self) -> &'static str {
        "minigame.dismiss_help"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.game_id
    }
}

impl Command for SubmitInput {
    fn command_type(&self) -> &'static str {
        "minigame.submit_input"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.game_id
    }
}

impl Command for AcknowledgeError {
    fn command_type(&self) -> &'static str {
        "minigame.acknowledge_error"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.game_id
    }
}

impl Command for AcknowledgeSuccess {
    fn command_type(&self) -> &'static str {
        "minigame.acknowledge_success"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.game_id
    }
}
