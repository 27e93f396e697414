//! Aggregate root for the Scenes context.

use powerskills_content::SceneKey;
use powerskills_core::aggregate::AggregateRoot;
use powerskills_core::clock::Clock;
use powerskills_core::error::DomainError;
use powerskills_core::event::EventMetadata;
use serde::Serialize;
use uuid::Uuid;

use super::events::{
    BriefingAcknowledged, IntroFinished, IntroStarted, JourneyEvent, JourneyEventKind,
    JourneyRestarted, JourneyStarted, LinkOpened, SceneCompleted, SceneEntered,
};

/// State of a scene's intro video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaState {
    /// Not asked to play yet.
    Pending,
    /// Playing.
    Playing,
    /// The runtime refused to start it; a manual trigger is offered.
    Blocked,
}

/// Where a scene is between entering and its stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntroStep {
    /// The briefing with this index is on screen.
    Briefing(usize),
    /// The intro video.
    Media(MediaState),
    /// The mini-game or the credits are mounted.
    Stage,
}

fn step_after(briefings_done: usize, briefings: usize, has_media: bool) -> IntroStep {
    if briefings_done < briefings {
        IntroStep::Briefing(briefings_done)
    } else if has_media {
        IntroStep::Media(MediaState::Pending)
    } else {
        IntroStep::Stage
    }
}

/// Progress of one player through the journey.
#[derive(Debug)]
pub struct JourneyProgress {
    /// Aggregate identifier.
    pub id: Uuid,
    pub(crate) started: bool,
    pub(crate) digest: Option<String>,
    pub(crate) scene: SceneKey,
    pub(crate) step: IntroStep,
    briefings: usize,
    has_media: bool,
    pub(crate) completed_scenes: usize,
    pub(crate) restarts: usize,
    /// Current version (event count).
    pub(crate) version: i64,
    uncommitted_events: Vec<JourneyEvent>,
}

impl JourneyProgress {
    /// Creates a journey that has not started.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            started: false,
            digest: None,
            scene: SceneKey::first(),
            step: IntroStep::Stage,
            briefings: 0,
            has_media: false,
            completed_scenes: 0,
            restarts: 0,
            version: 0,
            uncommitted_events: Vec::new(),
        }
    }

    /// Whether the journey has started.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Digest of the configuration the journey started with.
    #[must_use]
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// The scene on screen.
    #[must_use]
    pub fn scene(&self) -> SceneKey {
        self.scene
    }

    /// Where the scene is.
    #[must_use]
    pub fn step(&self) -> IntroStep {
        self.step
    }

    /// Scenes won since the start or the last restart.
    #[must_use]
    pub fn completed_scenes(&self) -> usize {
        self.completed_scenes
    }

    /// Number of restarts.
    #[must_use]
    pub fn restarts(&self) -> usize {
        self.restarts
    }

    fn record(&mut self, kind: JourneyEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = JourneyEvent {
            metadata: EventMetadata::caused_by(
                kind.event_type(),
                self.id,
                self.version + 1,
                correlation_id,
                clock.now(),
            ),
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
    }

    fn at_terminal_stage(&self) -> bool {
        self.started && self.scene.is_terminal() && self.step == IntroStep::Stage
    }

    /// Starts the journey.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if it already started.
    pub fn start(
        &mut self,
        title: &str,
        digest: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.started {
            return Err(DomainError::Validation("journey already started".to_owned()));
        }
        let kind = JourneyEventKind::Started(JourneyStarted {
            title: title.to_owned(),
            digest: digest.to_owned(),
        });
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Puts `scene` on screen, starting at its first briefing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` before the journey starts.
    pub fn enter_scene(
        &mut self,
        scene: SceneKey,
        briefings: usize,
        has_media: bool,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if !self.started {
            return Err(DomainError::Validation(format!(
                "cannot enter scene `{scene}` before the journey starts"
            )));
        }
        let kind = JourneyEventKind::SceneEntered(SceneEntered {
            scene,
            briefings,
            has_media,
        });
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Moves past the briefing on screen. No-op outside a briefing.
    pub fn acknowledge_briefing(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        let IntroStep::Briefing(index) = self.step else {
            return false;
        };
        let kind = JourneyEventKind::BriefingAcknowledged(BriefingAcknowledged {
            scene: self.scene,
            index,
        });
        self.record(kind, correlation_id, clock);
        true
    }

    /// Records the outcome of asking the intro video to play. Only valid
    /// while it is pending or blocked.
    pub fn record_intro_start(
        &mut self,
        src: &str,
        blocked: bool,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> bool {
        if !matches!(
            self.step,
            IntroStep::Media(MediaState::Pending | MediaState::Blocked)
        ) {
            return false;
        }
        let kind = JourneyEventKind::IntroStarted(IntroStarted {
            scene: self.scene,
            src: src.to_owned(),
            blocked,
        });
        self.record(kind, correlation_id, clock);
        true
    }

    /// Ends the intro. Skipping works in any media state; a natural end only
    /// while the video is playing.
    pub fn finish_intro(&mut self, skipped: bool, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        let allowed = match self.step {
            IntroStep::Media(MediaState::Playing) => true,
            IntroStep::Media(_) => skipped,
            IntroStep::Briefing(_) | IntroStep::Stage => false,
        };
        if !allowed {
            return false;
        }
        let kind = JourneyEventKind::IntroFinished(IntroFinished {
            scene: self.scene,
            skipped,
        });
        self.record(kind, correlation_id, clock);
        true
    }

    /// Records that the scene's mini-game was won.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` unless a game stage is mounted.
    pub fn complete_scene(
        &mut self,
        game: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if !self.started || self.step != IntroStep::Stage || self.scene.is_terminal() {
            return Err(DomainError::Validation(format!(
                "scene `{}` has no mini-game to complete",
                self.scene
            )));
        }
        let kind = JourneyEventKind::SceneCompleted(SceneCompleted {
            scene: self.scene,
            game: game.to_owned(),
        });
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Goes back to the beginning. Only offered by the credits.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` anywhere but the credits stage.
    pub fn restart(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        if !self.at_terminal_stage() {
            return Err(DomainError::Validation(format!(
                "restart is only offered by the credits, not by `{}`",
                self.scene
            )));
        }
        let kind = JourneyEventKind::Restarted(JourneyRestarted { from: self.scene });
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Records that the external link was followed. Only offered by the
    /// credits; the journey state is otherwise untouched.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` anywhere but the credits stage.
    pub fn open_link(
        &mut self,
        url: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if !self.at_terminal_stage() {
            return Err(DomainError::Validation(
                "the external link is only offered by the credits".to_owned(),
            ));
        }
        let kind = JourneyEventKind::LinkOpened(LinkOpened {
            url: url.to_owned(),
        });
        self.record(kind, correlation_id, clock);
        Ok(())
    }
}

impl AggregateRoot for JourneyProgress {
    type Event = JourneyEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            JourneyEventKind::Started(e) => {
                self.started = true;
                self.digest = Some(e.digest.clone());
            }
            JourneyEventKind::SceneEntered(e) => {
                self.scene = e.scene;
                self.briefings = e.briefings;
                self.has_media = e.has_media;
                self.step = step_after(0, e.briefings, e.has_media);
            }
            JourneyEventKind::BriefingAcknowledged(e) => {
                self.step = step_after(e.index + 1, self.briefings, self.has_media);
            }
            JourneyEventKind::IntroStarted(e) => {
                self.step = IntroStep::Media(if e.blocked {
                    MediaState::Blocked
                } else {
                    MediaState::Playing
                });
            }
            JourneyEventKind::IntroFinished(_) => self.step = IntroStep::Stage,
            JourneyEventKind::SceneCompleted(_) => self.completed_scenes += 1,
            JourneyEventKind::Restarted(_) => {
                self.restarts += 1;
                self.completed_scenes = 0;
            }
            JourneyEventKind::LinkOpened(_) => {}
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
