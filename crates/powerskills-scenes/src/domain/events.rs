//! Domain events for the Scenes context.

use powerskills_content::SceneKey;
use powerskills_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};

/// Event type name for [`JourneyEventKind::Started`].
pub const STARTED: &str = "journey.started";
/// Event type name for [`JourneyEventKind::SceneEntered`].
pub const SCENE_ENTERED: &str = "journey.scene_entered";
/// Event type name for [`JourneyEventKind::BriefingAcknowledged`].
pub const BRIEFING_ACKNOWLEDGED: &str = "journey.briefing_acknowledged";
/// Event type name for [`JourneyEventKind::IntroStarted`].
pub const INTRO_STARTED: &str = "journey.intro_started";
/// Event type name for [`JourneyEventKind::IntroFinished`].
pub const INTRO_FINISHED: &str = "journey.intro_finished";
/// Event type name for [`JourneyEventKind::SceneCompleted`].
pub const SCENE_COMPLETED: &str = "journey.scene_completed";
/// Event type name for [`JourneyEventKind::Restarted`].
pub const RESTARTED: &str = "journey.restarted";
/// Event type name for [`JourneyEventKind::LinkOpened`].
pub const LINK_OPENED: &str = "journey.link_opened";

/// Emitted once, when the player starts the journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyStarted {
    /// Journey title.
    pub title: String,
    /// SHA-256 of the configuration the journey was loaded from.
    pub digest: String,
}

/// Emitted when a scene comes on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneEntered {
    /// The scene.
    pub scene: SceneKey,
    /// Number of briefing dialogs before the video.
    pub briefings: usize,
    /// Whether the scene has an intro video.
    pub has_media: bool,
}

/// Emitted when a briefing dialog is acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefingAcknowledged {
    /// The scene.
    pub scene: SceneKey,
    /// Zero-based index of the briefing.
    pub index: usize,
}

/// Emitted when the intro video was asked to play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntroStarted {
    /// The scene.
    pub scene: SceneKey,
    /// Video source.
    pub src: String,
    /// Whether the runtime refused to start it.
    pub blocked: bool,
}

/// Emitted when the intro is over and the stage mounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntroFinished {
    /// The scene.
    pub scene: SceneKey,
    /// `true` if the player skipped, `false` if the video ended.
    pub skipped: bool,
}

/// Emitted when a scene's mini-game was won and acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneCompleted {
    /// The scene.
    pub scene: SceneKey,
    /// Definition key of the mini-game that was won.
    pub game: String,
}

/// Emitted when the player restarts from the credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyRestarted {
    /// The scene the restart was requested from.
    pub from: SceneKey,
}

/// Emitted when the player follows the external link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOpened {
    /// The URL.
    pub url: String,
}

/// Event payload variants for the Scenes context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JourneyEventKind {
    /// The journey started.
    Started(JourneyStarted),
    /// A scene came on screen.
    SceneEntered(SceneEntered),
    /// A briefing was acknowledged.
    BriefingAcknowledged(BriefingAcknowledged),
    /// The intro video was asked to play.
    IntroStarted(IntroStarted),
    /// The intro is over.
    IntroFinished(IntroFinished),
    /// The scene's mini-game was won.
    SceneCompleted(SceneCompleted),
    /// The journey went back to the first scene.
    Restarted(JourneyRestarted),
    /// The external link was followed.
    LinkOpened(LinkOpened),
}

impl JourneyEventKind {
    /// The event type name of this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Started(_) => STARTED,
            Self::SceneEntered(_) => SCENE_ENTERED,
            Self::BriefingAcknowledged(_) => BRIEFING_ACKNOWLEDGED,
            Self::IntroStarted(_) => INTRO_STARTED,
            Self::IntroFinished(_) => INTRO_FINISHED,
            Self::SceneCompleted(_) => SCENE_COMPLETED,
            Self::Restarted(_) => RESTARTED,
            Self::LinkOpened(_) => LINK_OPENED,
        }
    }
}

/// Domain event envelope for the Scenes context.
#[derive(Debug, Clone)]
pub struct JourneyEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: JourneyEventKind,
}

impl DomainEvent for JourneyEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("JourneyEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
