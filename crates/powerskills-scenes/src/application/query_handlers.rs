//! Query handlers for the Scenes context.

use powerskills_content::SceneKey;
use powerskills_content::markdown::to_plain_text;
use powerskills_core::aggregate::AggregateRoot;
use powerskills_core::error::DomainError;
use powerskills_core::journal::EventJournal;
use powerskills_minigame::application::mounted::OpenGate;
use powerskills_minigame::application::query_handlers::{MiniGameView, get_mounted_view};
use powerskills_narration::{GateContent, ModalGate, NarratorState, Tone};
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::application::sequencer::{SceneSequencer, Stage};
use crate::domain::aggregates::{IntroStep, MediaState};
use crate::domain::session::SessionState;

/// The dialog on screen, with its body rendered as plain text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalView {
    /// `briefing`, `help`, `error` or `success`.
    pub source: &'static str,
    /// Dialog tone.
    pub tone: Tone,
    /// Heading.
    pub title: String,
    /// Body without markdown.
    pub body: String,
    /// Label of the primary action.
    pub primary_label: String,
    /// State of the dialog's narration.
    pub narration: NarratorState,
}

impl ModalView {
    fn new(source: &'static str, content: &GateContent, narration: NarratorState) -> Self {
        Self {
            source,
            tone: content.tone,
            title: content.title.clone(),
            body: to_plain_text(&content.body),
            primary_label: content.primary_label.clone(),
            narration,
        }
    }

    fn of_gate(source: &'static str, gate: &ModalGate) -> Self {
        Self::new(source, gate.content(), gate.narration_state())
    }
}

/// The intro video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaView {
    /// Video source.
    pub src: String,
    /// Poster frame.
    pub poster: Option<String>,
    /// Playback state.
    pub state: MediaState,
    /// Label of the skip control, always offered.
    pub skip_label: String,
}

/// The credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditsView {
    /// Heading.
    pub title: String,
    /// Body without markdown.
    pub body: String,
    /// Label of the restart control.
    pub restart_label: String,
    /// Label of the external link.
    pub more_label: String,
    /// External resource.
    pub link: String,
    /// State of the closing narration.
    pub narration: NarratorState,
}

/// Read-only view of everything on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyView {
    /// The journey instance id.
    pub journey_id: Uuid,
    /// Journey title.
    pub title: String,
    /// The scene on screen.
    pub scene: SceneKey,
    /// One-based position of the scene.
    pub scene_number: usize,
    /// Number of scenes.
    pub scene_count: usize,
    /// Where the scene is.
    pub step: IntroStep,
    /// The open dialog.
    pub modal: Option<ModalView>,
    /// The intro video, while it is the current step.
    pub media: Option<MediaView>,
    /// The mounted mini-game.
    pub game: Option<MiniGameView>,
    /// The credits, when mounted.
    pub credits: Option<CreditsView>,
    /// Session state.
    pub session: SessionState,
    /// Scenes won since the start or last restart.
    pub completed_scenes: usize,
    /// Number of restarts.
    pub restarts: usize,
    /// Current version (event count).
    pub version: i64,
}

/// Builds the view of a running sequencer.
#[must_use]
pub fn get_journey_view(sequencer: &SceneSequencer) -> JourneyView {
    let progress = sequencer.progress();
    let scene = progress.scene();
    let definition = sequencer.journey().scene(scene);

    let media = match progress.step() {
        IntroStep::Media(state) => definition
            .and_then(|d| d.intro.media.as_ref())
            .map(|m| MediaView {
                src: m.src.clone(),
                poster: m.poster.clone(),
                state,
                skip_label: m.skip_label.clone(),
            }),
        IntroStep::Briefing(_) | IntroStep::Stage => None,
    };

    let mut modal = sequencer
        .briefing()
        .filter(|gate| gate.is_open())
        .map(|gate| ModalView::of_gate("briefing", gate));
    let mut game = None;
    let mut credits = None;
    match sequencer.stage() {
        Some(Stage::Game(mounted)) => {
            if modal.is_none() {
                modal = mounted.open_gate().map(|(which, gate)| {
                    let source = match which {
                        OpenGate::Help => "help",
                        OpenGate::Error => "error",
                        OpenGate::Success => "success",
                    };
                    ModalView::of_gate(source, gate)
                });
            }
            game = Some(get_mounted_view(mounted));
        }
        Some(Stage::Credits(stage)) => {
            let c = stage.definition();
            credits = Some(CreditsView {
                title: c.title.clone(),
                body: to_plain_text(&c.body),
                restart_label: c.restart_label.clone(),
                more_label: c.more_label.clone(),
                link: c.link.clone(),
                narration: stage.narration_state(),
            });
        }
        None => {}
    }

    JourneyView {
        journey_id: sequencer.journey_id(),
        title: sequencer.journey().title.clone(),
        scene,
        scene_number: scene.index() + 1,
        scene_count: SceneKey::ALL.len(),
        step: progress.step(),
        modal,
        media,
        game,
        credits,
        session: sequencer.session().clone(),
        completed_scenes: progress.completed_scenes(),
        restarts: progress.restarts(),
        version: progress.version(),
    }
}

/// Journaled progress of a journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JourneyProgressView {
    /// The journey instance id.
    pub journey_id: Uuid,
    /// Digest of the configuration it started with.
    pub digest: Option<String>,
    /// The scene last entered.
    pub scene: SceneKey,
    /// Where that scene is.
    pub step: IntroStep,
    /// Scenes won since the start or last restart.
    pub completed_scenes: usize,
    /// Number of restarts.
    pub restarts: usize,
    /// Current version (event count).
    pub version: i64,
}

/// Rebuilds a journey's progress from the journal.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the journal holds no events for the
/// journey, or `DomainError::Infrastructure` if a payload cannot be read.
pub fn get_journey_by_id(
    journey_id: Uuid,
    journal: &dyn EventJournal,
) -> Result<JourneyProgressView, DomainError> {
    let events = journal.events();
    if !events.iter().any(|e| e.aggregate_id == journey_id) {
        return Err(DomainError::Validation(format!(
            "no journaled events for journey {journey_id}"
        )));
    }
    let journey = command_handlers::reconstitute(journey_id, &events)?;
    Ok(JourneyProgressView {
        journey_id,
        digest: journey.digest().map(str::to_owned),
        scene: journey.scene(),
        step: journey.step(),
        completed_scenes: journey.completed_scenes(),
        restarts: journey.restarts(),
        version: journey.version(),
    })
}

#[cfg(test)]
mod tests {
    use powerskills_core::journal::InMemoryJournal;

    use super::*;

    #[test]
    fn test_get_journey_by_id_without_events_is_an_error() {
        let journal = InMemoryJournal::new();

        let result = get_journey_by_id(Uuid::new_v4(), &journal);

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_modal_view_renders_plain_body() {
        let content = GateContent {
            tone: Tone::Info,
            title: "Juego".to_owned(),
            body: "Haz clic en la **brújula 3D**.".to_owned(),
            primary_label: "Comenzar".to_owned(),
            narration: None,
        };

        let view = ModalView::new("help", &content, NarratorState::Idle);

        assert_eq!(view.body, "Haz clic en la brújula 3D.");
        assert_eq!(view.source, "help");
    }
}
