//! The scene sequencer.
//!
//! Owns everything on screen for the current scene: the briefing dialog, the
//! intro video, and the stage mounted after it. Leaving a scene tears all of
//! it down before the next scene is entered, so no narration or timer of
//! scene N survives into scene N+1.

use std::sync::Arc;

use powerskills_content::{
    CreditsDefinition, Journey, LoadedJourney, SceneDefinition, SceneKey, StageDefinition,
};
use powerskills_core::error::DomainError;
use powerskills_minigame::application::mounted::{GameServices, GameSignal, MountedGame};
use powerskills_minigame::domain::input::PlayerInput;
use powerskills_minigame::domain::pointer::PointerEvent;
use powerskills_minigame::domain::win_condition::Judgement;
use powerskills_narration::{MediaPlayer, ModalGate, Narrator, NarratorState, OwnerId};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::command_handlers::{
    handle_acknowledge_briefing, handle_complete_scene, handle_enter_scene, handle_finish_intro,
    handle_open_external_link, handle_record_intro_start, handle_restart_journey,
    handle_start_journey,
};
use crate::application::query_handlers::{JourneyView, get_journey_view};
use crate::domain::aggregates::{IntroStep, JourneyProgress, MediaState};
use crate::domain::commands::{
    AcknowledgeBriefing, CompleteScene, EnterScene, FinishIntro, OpenExternalLink,
    RecordIntroStart, RestartJourney, StartJourney,
};
use crate::domain::session::SessionState;

/// The credits, mounted as the terminal scene's stage.
#[derive(Debug)]
pub struct CreditsStage {
    definition: CreditsDefinition,
    narrator: Narrator,
}

impl CreditsStage {
    /// The configured credits.
    #[must_use]
    pub fn definition(&self) -> &CreditsDefinition {
        &self.definition
    }

    /// State of the closing narration.
    #[must_use]
    pub fn narration_state(&self) -> NarratorState {
        self.narrator.state()
    }
}

/// What a scene mounts once its intro is over.
#[derive(Debug)]
pub enum Stage {
    /// A mini-game.
    Game(MountedGame),
    /// The credits.
    Credits(CreditsStage),
}

/// Drives the journey through its fixed scene order.
pub struct SceneSequencer {
    journey: Journey,
    digest: String,
    progress: JourneyProgress,
    session: SessionState,
    services: GameServices,
    media: Arc<dyn MediaPlayer>,
    briefing: Option<ModalGate>,
    stage: Option<Stage>,
}

impl std::fmt::Debug for SceneSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneSequencer")
            .field("journey_id", &self.progress.id)
            .field("scene", &self.progress.scene())
            .field("step", &self.progress.step())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl SceneSequencer {
    /// Creates a sequencer for `loaded`. Nothing is on screen until
    /// [`SceneSequencer::start`].
    #[must_use]
    pub fn new(
        loaded: LoadedJourney,
        session: SessionState,
        services: GameServices,
        media: Arc<dyn MediaPlayer>,
    ) -> Self {
        Self {
            journey: loaded.journey,
            digest: loaded.digest,
            progress: JourneyProgress::new(Uuid::new_v4()),
            session,
            services,
            media,
            briefing: None,
            stage: None,
        }
    }

    /// The journey instance id.
    #[must_use]
    pub fn journey_id(&self) -> Uuid {
        self.progress.id
    }

    /// The configuration being played.
    #[must_use]
    pub fn journey(&self) -> &Journey {
        &self.journey
    }

    /// Digest of the configuration source.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// The progress aggregate.
    #[must_use]
    pub fn progress(&self) -> &JourneyProgress {
        &self.progress
    }

    /// Session state.
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// The scene on screen.
    #[must_use]
    pub fn current_scene(&self) -> SceneKey {
        self.progress.scene()
    }

    /// The open briefing dialog.
    #[must_use]
    pub fn briefing(&self) -> Option<&ModalGate> {
        self.briefing.as_ref()
    }

    /// The mounted stage.
    #[must_use]
    pub fn stage(&self) -> Option<&Stage> {
        self.stage.as_ref()
    }

    /// The mounted mini-game.
    #[must_use]
    pub fn mounted_game(&self) -> Option<&MountedGame> {
        match &self.stage {
            Some(Stage::Game(game)) => Some(game),
            _ => None,
        }
    }

    /// Read-only view of everything on screen.
    #[must_use]
    pub fn view(&self) -> JourneyView {
        get_journey_view(self)
    }

    /// Records the name the player gave.
    pub fn set_player_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        debug!(%name, "player name set");
        self.session.player_name = Some(name);
    }

    fn scene_definition(&self, key: SceneKey) -> Result<&SceneDefinition, DomainError> {
        let scene = self.journey.scene(key);
        debug_assert!(scene.is_some(), "validated journey has no scene `{key}`");
        scene.ok_or_else(|| DomainError::SceneNotFound(key.to_string()))
    }

    /// Starts the journey at the first scene.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if it already started, or a journal
    /// error.
    pub async fn start(&mut self, correlation_id: Uuid) -> Result<(), DomainError> {
        let command = StartJourney {
            correlation_id,
            journey_id: self.progress.id,
            title: self.journey.title.clone(),
            digest: self.digest.clone(),
        };
        handle_start_journey(
            &command,
            &mut self.progress,
            &*self.services.clock,
            &*self.services.journal,
        )?;
        self.enter(SceneKey::first(), correlation_id).await
    }

    fn teardown(&mut self) {
        self.briefing = None;
        match self.stage.take() {
            Some(Stage::Game(game)) => game.unmount(),
            Some(Stage::Credits(credits)) => {
                debug!(narration = ?credits.narration_state(), "credits unmounted");
            }
            None => {}
        }
    }

    async fn enter(&mut self, scene: SceneKey, correlation_id: Uuid) -> Result<(), DomainError> {
        self.teardown();
        let definition = self.scene_definition(scene)?;
        let command = EnterScene {
            correlation_id,
            journey_id: self.progress.id,
            scene,
            briefings: definition.intro.briefings.len(),
            has_media: definition.intro.media.is_some(),
        };
        handle_enter_scene(
            &command,
            &mut self.progress,
            &*self.services.clock,
            &*self.services.journal,
        )?;
        self.session.current_scene = scene;
        self.settle(correlation_id).await
    }

    /// Brings what is on screen in line with the intro step.
    async fn settle(&mut self, correlation_id: Uuid) -> Result<(), DomainError> {
        match self.progress.step() {
            IntroStep::Briefing(index) => self.open_briefing(index),
            IntroStep::Media(MediaState::Pending) => self.play_intro(correlation_id).await,
            IntroStep::Media(_) => Ok(()),
            IntroStep::Stage if self.stage.is_none() => self.mount_stage(correlation_id),
            IntroStep::Stage => Ok(()),
        }
    }

    fn open_briefing(&mut self, index: usize) -> Result<(), DomainError> {
        self.briefing = None;
        let content = self
            .scene_definition(self.progress.scene())?
            .intro
            .briefings
            .get(index)
            .cloned()
            .ok_or_else(|| {
                DomainError::Content(format!(
                    "scene `{}` has no briefing {index}",
                    self.progress.scene()
                ))
            })?;
        let narrator = Narrator::new(&self.services.arbitrator, Arc::clone(&self.services.speech));
        let mut gate = ModalGate::new(content, narrator);
        gate.set_open(true);
        self.briefing = Some(gate);
        Ok(())
    }

    async fn play_intro(&mut self, correlation_id: Uuid) -> Result<(), DomainError> {
        let src = self
            .scene_definition(self.progress.scene())?
            .intro
            .media
            .as_ref()
            .map(|media| media.src.clone())
            .ok_or_else(|| {
                DomainError::Content(format!(
                    "scene `{}` has no intro video",
                    self.progress.scene()
                ))
            })?;
        let blocked = match self.media.play(&src).await {
            Ok(()) => false,
            Err(error) => {
                warn!(%src, %error, "intro video did not start");
                true
            }
        };
        let command = RecordIntroStart {
            correlation_id,
            journey_id: self.progress.id,
            src,
            blocked,
        };
        handle_record_intro_start(
            &command,
            &mut self.progress,
            &*self.services.clock,
            &*self.services.journal,
        )?;
        Ok(())
    }

    fn mount_stage(&mut self, correlation_id: Uuid) -> Result<(), DomainError> {
        let scene = self.progress.scene();
        let stage = match &self.scene_definition(scene)?.stage {
            StageDefinition::Game(definition) => {
                Stage::Game(MountedGame::mount(definition, &self.services, correlation_id)?)
            }
            StageDefinition::Credits(definition) => {
                let mut narrator =
                    Narrator::new(&self.services.arbitrator, Arc::clone(&self.services.speech));
                if let Some(narration) = &definition.narration {
                    narrator.play(narration);
                }
                Stage::Credits(CreditsStage {
                    definition: definition.clone(),
                    narrator,
                })
            }
        };
        info!(%scene, "stage mounted");
        self.stage = Some(stage);
        Ok(())
    }

    /// The primary action of whatever dialog is open. Returns whether a
    /// dialog was acknowledged.
    ///
    /// # Errors
    ///
    /// Returns a journal error.
    pub async fn press_primary(&mut self, correlation_id: Uuid) -> Result<bool, DomainError> {
        if self.briefing.as_ref().is_some_and(ModalGate::acknowledge) {
            let command = AcknowledgeBriefing {
                correlation_id,
                journey_id: self.progress.id,
            };
            handle_acknowledge_briefing(
                &command,
                &mut self.progress,
                &*self.services.clock,
                &*self.services.journal,
            )?;
            self.briefing = None;
            self.settle(correlation_id).await?;
            return Ok(true);
        }

        let Some(Stage::Game(game)) = &mut self.stage else {
            return Ok(false);
        };
        let had_gate = game.open_gate().is_some();
        if game.press_primary(correlation_id)? == GameSignal::Finished {
            self.advance(correlation_id).await?;
        }
        Ok(had_gate)
    }

    /// Skips the intro video and mounts the stage. Available while the
    /// video plays and when it was blocked.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Content` if the stage cannot be mounted, or a
    /// journal error.
    pub fn skip_intro(&mut self, correlation_id: Uuid) -> Result<bool, DomainError> {
        self.finish_intro(true, correlation_id)
    }

    /// Host callback: the intro video reached its end.
    ///
    /// # Errors
    ///
    /// See [`SceneSequencer::skip_intro`].
    pub fn media_ended(&mut self, correlation_id: Uuid) -> Result<bool, DomainError> {
        self.finish_intro(false, correlation_id)
    }

    fn finish_intro(&mut self, skipped: bool, correlation_id: Uuid) -> Result<bool, DomainError> {
        let playing = self.progress.step() == IntroStep::Media(MediaState::Playing);
        let command = FinishIntro {
            correlation_id,
            journey_id: self.progress.id,
            skipped,
        };
        let finished = handle_finish_intro(
            &command,
            &mut self.progress,
            &*self.services.clock,
            &*self.services.journal,
        )?;
        if !finished {
            return Ok(false);
        }
        if skipped && playing {
            self.media.pause();
        }
        self.mount_stage(correlation_id)?;
        Ok(true)
    }

    /// Manual play trigger for an intro video the runtime refused to start.
    ///
    /// # Errors
    ///
    /// Returns a journal error.
    pub async fn retry_media(&mut self, correlation_id: Uuid) -> Result<bool, DomainError> {
        if self.progress.step() != IntroStep::Media(MediaState::Blocked) {
            return Ok(false);
        }
        self.play_intro(correlation_id).await?;
        Ok(self.progress.step() == IntroStep::Media(MediaState::Playing))
    }

    /// Sends an input to the mounted mini-game. `None` when no game is
    /// mounted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownOption` / `DomainError::Validation` for
    /// malformed input, or a journal error.
    pub fn submit_input(
        &mut self,
        input: PlayerInput,
        correlation_id: Uuid,
    ) -> Result<Option<Judgement>, DomainError> {
        match &mut self.stage {
            Some(Stage::Game(game)) => game.submit(input, correlation_id).map(Some),
            _ => Ok(None),
        }
    }

    /// Routes a pointer event to the mounted mini-game.
    ///
    /// # Errors
    ///
    /// See [`SceneSequencer::submit_input`].
    pub fn pointer(
        &mut self,
        event: &mut PointerEvent,
        correlation_id: Uuid,
    ) -> Result<Option<Judgement>, DomainError> {
        match &mut self.stage {
            Some(Stage::Game(game)) => game.pointer(event, correlation_id),
            _ => Ok(None),
        }
    }

    /// Manual trigger for narration the runtime refused to autoplay.
    pub fn replay_narration(&mut self) -> Option<NarratorState> {
        if let Some(briefing) = &mut self.briefing {
            return Some(briefing.replay_narration());
        }
        match &mut self.stage {
            Some(Stage::Game(game)) => Some(game.replay_narration()),
            Some(Stage::Credits(credits)) => Some(credits.narrator.play_on_gesture()),
            None => None,
        }
    }

    /// Host callback: narration for `owner` reached its end.
    pub fn narration_ended(&mut self, owner: OwnerId) -> bool {
        if let Some(briefing) = &mut self.briefing {
            let narrator = briefing.narrator_mut();
            if narrator.id() == owner {
                narrator.on_ended();
                return true;
            }
        }
        match &mut self.stage {
            Some(Stage::Game(game)) => game.narration_ended(owner),
            Some(Stage::Credits(credits)) if credits.narrator.id() == owner => {
                credits.narrator.on_ended();
                true
            }
            _ => false,
        }
    }

    /// Fires due timers of the mounted game, advancing if it finished.
    ///
    /// # Errors
    ///
    /// Returns a journal error.
    pub async fn tick(&mut self, correlation_id: Uuid) -> Result<(), DomainError> {
        let Some(Stage::Game(game)) = &mut self.stage else {
            return Ok(());
        };
        if game.tick(correlation_id)? == GameSignal::Finished {
            self.advance(correlation_id).await?;
        }
        Ok(())
    }

    async fn advance(&mut self, correlation_id: Uuid) -> Result<(), DomainError> {
        let game = match self.stage.take() {
            Some(Stage::Game(game)) => game,
            other => {
                self.stage = other;
                return Err(DomainError::Validation(
                    "no mini-game is mounted".to_owned(),
                ));
            }
        };
        if let Some(choice) = game.final_choice() {
            info!(choice = %choice.id, "reflection choice recorded");
            self.session.chosen_reflection_skill = Some(choice.label.clone());
        }
        let key = game.definition().key.clone();
        game.unmount();

        let command = CompleteScene {
            correlation_id,
            journey_id: self.progress.id,
            game: key,
        };
        handle_complete_scene(
            &command,
            &mut self.progress,
            &*self.services.clock,
            &*self.services.journal,
        )?;
        let scene = self.progress.scene();
        self.session
            .set_flag(SessionState::completion_flag(scene), true);

        let next = scene.next();
        debug_assert!(next.is_some(), "scene `{scene}` has a game but no successor");
        let next = next.ok_or_else(|| DomainError::SceneNotFound(format!("after `{scene}`")))?;
        self.enter(next, correlation_id).await
    }

    /// Back to the first scene with fresh session state. Only offered by the
    /// credits.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` anywhere but the credits stage.
    pub async fn restart(&mut self, correlation_id: Uuid) -> Result<(), DomainError> {
        let command = RestartJourney {
            correlation_id,
            journey_id: self.progress.id,
        };
        handle_restart_journey(
            &command,
            &mut self.progress,
            &*self.services.clock,
            &*self.services.journal,
        )?;
        self.session.reset();
        self.enter(SceneKey::first(), correlation_id).await
    }

    /// Follows the credits' external link. Returns the URL for the host to
    /// open; the journey itself stays where it is.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` anywhere but the credits stage.
    pub fn open_external_link(&mut self, correlation_id: Uuid) -> Result<String, DomainError> {
        let Some(Stage::Credits(credits)) = &self.stage else {
            return Err(DomainError::Validation(
                "the external link is only offered by the credits".to_owned(),
            ));
        };
        let url = credits.definition.link.clone();
        let command = OpenExternalLink {
            correlation_id,
            journey_id: self.progress.id,
            url: url.clone(),
        };
        handle_open_external_link(
            &command,
            &mut self.progress,
            &*self.services.clock,
            &*self.services.journal,
        )?;
        Ok(url)
    }
}
