//! Commands for the Scenes context.

use powerskills_content::SceneKey;
use powerskills_core::command::Command;
use uuid::Uuid;

/// Command to start the journey.
#[derive(Debug, Clone)]
pub struct StartJourney {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The journey instance.
    pub journey_id: Uuid,
    /// Journey title.
    pub title: String,
    /// Configuration digest.
    pub digest: String,
}

/// Command to put a scene on screen.
#[derive(Debug, Clone)]
pub struct EnterScene {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The journey instance.
    pub journey_id: Uuid,
    /// The scene.
    pub scene: SceneKey,
    /// Number of briefings the scene opens with.
    pub briefings: usize,
    /// Whether the scene has an intro video.
    pub has_media: bool,
}

/// Command to acknowledge the briefing on screen.
#[derive(Debug, Clone)]
pub struct AcknowledgeBriefing {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The journey instance.
    pub journey_id: Uuid,
}

/// Command to record the outcome of starting the intro video.
#[derive(Debug, Clone)]
pub struct RecordIntroStart {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The journey instance.
    pub journey_id: Uuid,
    /// Video source.
    pub src: String,
    /// Whether the runtime refused to start it.
    pub blocked: bool,
}

/// Command to end the intro, by skip or natural end.
#[derive(Debug, Clone)]
pub struct FinishIntro {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The journey instance.
    pub journey_id: Uuid,
    /// Whether the player skipped.
    pub skipped: bool,
}

/// Command to record that the scene's mini-game was won.
#[derive(Debug, Clone)]
pub struct CompleteScene {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The journey instance.
    pub journey_id: Uuid,
    /// Definition key of the won mini-game.
    pub game: String,
}

/// Command to go back to the first scene from the credits.
#[derive(Debug, Clone)]
pub struct RestartJourney {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The journey instance.
    pub journey_id: Uuid,
}

/// Command to follow the credits' external link.
#[derive(Debug, Clone)]
pub struct OpenExternalLink {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The journey instance.
    pub journey_id: Uuid,
    /// The URL.
    pub url: String,
}

impl Command for StartJourney {
    fn command_type(&self) -> &'static str {
        "journey.start"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.journey_id
    }
}

impl Command for EnterScene {
    fn command_type(&self) -> &'static str {
        "journey.enter_scene"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.journey_id
    }
}

impl Command for AcknowledgeBriefing {
    fn command_type(&self) -> &'static str {
        "journey.acknowledge_briefing"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.journey_id
    }
}

impl Command for RecordIntroStart {
    fn command_type(&self) -> &'static str {
        "journey.record_intro_start"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.journey_id
    }
}

impl Command for FinishIntro {
    fn command_type(&self) -> &'static str {
        "journey.finish_intro"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.journey_id
    }
}

impl Command for CompleteScene {
    fn command_type(&self) -> &'static str {
        "journey.complete_scene"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.journey_id
    }
}

impl Command for RestartJourney {
    fn command_type(&self) -> &'static str {
        "journey.restart"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.journey_id
    }
}

impl Command for OpenExternalLink {
    fn command_type(&self) -> &'static str {
        "journey.open_external_link"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> Uuid {
        self.journey_id
    }
}
