//! A mini-game mounted inside a scene.
//!
//! `MountedGame` wires the `MiniGame` aggregate to everything that has a
//! lifetime on screen: one modal gate per phase, the narrator for option
//! cues, the pointer gesture trackers and pending timers. The gates follow
//! the phase, so at most one of them is open at any moment. Dropping the
//! game silences every narrator it owns and cancels its timers.

use std::sync::Arc;

use powerskills_core::clock::Clock;
use powerskills_core::error::DomainError;
use powerskills_core::journal::EventJournal;
use powerskills_narration::{
    ModalGate, NarrationArbitrator, Narrator, NarratorState, OwnerId, SpeechBackend,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::command_handlers::{
    handle_acknowledge_error, handle_acknowledge_success, handle_dismiss_help, handle_submit_input,
};
use crate::application::timers::TimerQueue;
use crate::domain::aggregates::{MiniGame, MiniGamePhase};
use crate::domain::commands::{AcknowledgeError, AcknowledgeSuccess, DismissHelp, SubmitInput};
use crate::domain::definition::MiniGameDefinition;
use crate::domain::input::{OptionId, PlayerInput};
use crate::domain::pointer::{DragTracker, PointerEvent, PointerPhase, PointerTarget, SliderTracker};
use crate::domain::win_condition::{Judgement, SelectionOption, WinCondition};

/// Shared services a mounted game runs against.
#[derive(Clone)]
pub struct GameServices {
    /// The process-wide narration arbitrator.
    pub arbitrator: NarrationArbitrator,
    /// Host speech capability.
    pub speech: Arc<dyn SpeechBackend>,
    /// Time source for events and timers.
    pub clock: Arc<dyn Clock>,
    /// Audit trail of every transition.
    pub journal: Arc<dyn EventJournal>,
}

impl std::fmt::Debug for GameServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameServices").finish_non_exhaustive()
    }
}

/// Whether the owning scene should advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameSignal {
    /// Keep the game mounted.
    Continue,
    /// The win was acknowledged; advance to the next scene.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameTimer {
    OpenSuccessGate,
    AutoAdvance,
}

/// Which gate is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenGate {
    /// Instructions.
    Help,
    /// Wrong input.
    Error,
    /// Win.
    Success,
}

/// A live mini-game with its dialogs, narration and timers.
#[derive(Debug)]
pub struct MountedGame {
    definition: MiniGameDefinition,
    game: MiniGame,
    help: Option<ModalGate>,
    error: ModalGate,
    success: Option<ModalGate>,
    success_shown: bool,
    cue: Narrator,
    timers: TimerQueue<GameTimer>,
    drag: DragTracker,
    slider: Option<SliderTracker>,
    services: GameServices,
}

impl MountedGame {
    /// Mounts `definition`. The help dialog opens immediately; a game
    /// without one starts in the playing phase.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Content` for an invalid definition, or a journal
    /// error.
    pub fn mount(
        definition: &MiniGameDefinition,
        services: &GameServices,
        correlation_id: Uuid,
    ) -> Result<Self, DomainError> {
        definition.validate().map_err(DomainError::Content)?;

        let gate = |content| {
            ModalGate::new(
                content,
                Narrator::new(&services.arbitrator, Arc::clone(&services.speech)),
            )
        };
        let slider = match &definition.condition {
            WinCondition::ToleranceBand { rail, .. } => Some(SliderTracker::new(*rail)),
            _ => None,
        };

        let mut mounted = Self {
            game: MiniGame::new(Uuid::new_v4(), definition.key.clone(), definition.condition.clone()),
            help: definition.help.clone().map(gate),
            error: gate(definition.error_gate()),
            success: definition.success.clone().map(gate),
            success_shown: false,
            cue: Narrator::new(&services.arbitrator, Arc::clone(&services.speech)),
            timers: TimerQueue::new(),
            drag: DragTracker::new(),
            slider,
            definition: definition.clone(),
            services: services.clone(),
        };
        info!(
            game = %definition.key,
            strategy = definition.condition.strategy(),
            "mini-game mounted"
        );

        if mounted.help.is_none() {
            let command = DismissHelp {
                correlation_id,
                game_id: mounted.game.id,
            };
            handle_dismiss_help(&command, &mut mounted.game, &*services.clock, &*services.journal)?;
        }
        mounted.sync_gates();
        Ok(mounted)
    }

    /// The aggregate instance id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.game.id
    }

    /// The aggregate.
    #[must_use]
    pub fn game(&self) -> &MiniGame {
        &self.game
    }

    /// The definition this game was mounted from.
    #[must_use]
    pub fn definition(&self) -> &MiniGameDefinition {
        &self.definition
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> MiniGamePhase {
        self.game.phase()
    }

    /// The selection of a free-choice game.
    #[must_use]
    pub fn final_choice(&self) -> Option<&SelectionOption> {
        self.game.final_choice()
    }

    /// Number of pending timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// The gate currently showing, if any.
    #[must_use]
    pub fn open_gate(&self) -> Option<(OpenGate, &ModalGate)> {
        if let Some(help) = self.help.as_ref().filter(|g| g.is_open()) {
            return Some((OpenGate::Help, help));
        }
        if self.error.is_open() {
            return Some((OpenGate::Error, &self.error));
        }
        self.success
            .as_ref()
            .filter(|g| g.is_open())
            .map(|g| (OpenGate::Success, g))
    }

    /// State of the option cue narrator.
    #[must_use]
    pub fn cue_state(&self) -> NarratorState {
        self.cue.state()
    }

    fn sync_gates(&mut self) {
        let phase = self.game.phase();
        let show_help = phase == MiniGamePhase::Help;
        let show_error = phase == MiniGamePhase::Error;
        let show_success =
            phase == MiniGamePhase::Success && self.success_shown && !self.game.is_acknowledged();

        // Close first so the gate that opens owns the narration.
        if let Some(help) = self.help.as_mut().filter(|_| !show_help) {
            help.set_open(false);
        }
        if !show_error {
            self.error.set_open(false);
        }
        if let Some(success) = self.success.as_mut().filter(|_| !show_success) {
            success.set_open(false);
        }

        if let Some(help) = self.help.as_mut().filter(|_| show_help) {
            help.set_open(true);
        }
        if show_error && !self.error.is_open() {
            let placeholders = self
                .game
                .last_rejection()
                .map(|r| r.placeholders())
                .unwrap_or_default();
            self.error
                .set_content(self.definition.error_gate().fill(&placeholders));
            self.error.set_open(true);
        }
        if let Some(success) = self.success.as_mut().filter(|_| show_success) {
            success.set_open(true);
        }
    }

    fn play_cue(&mut self, option: &OptionId) {
        if let Some(content) = self.definition.cue(option) {
            self.cue.play(&content);
        }
    }

    /// Evaluates one input.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownOption` / `DomainError::Validation` for
    /// malformed input, or a journal error.
    pub fn submit(&mut self, input: PlayerInput, correlation_id: Uuid) -> Result<Judgement, DomainError> {
        let was_playing = self.game.phase() == MiniGamePhase::Playing;
        let command = SubmitInput {
            correlation_id,
            game_id: self.game.id,
            input,
        };
        let judgement = handle_submit_input(
            &command,
            &mut self.game,
            &*self.services.clock,
            &*self.services.journal,
        )?;

        if let PlayerInput::Choose { option } = &command.input {
            let revisit = matches!(self.game.condition(), WinCondition::ExhaustiveVisit { .. })
                && was_playing
                && judgement == Judgement::Ignored;
            if matches!(judgement, Judgement::Accepted | Judgement::Completed) || revisit {
                self.play_cue(option);
            }
        }

        if judgement == Judgement::Completed {
            let action = if self.success.is_some() {
                GameTimer::OpenSuccessGate
            } else {
                GameTimer::AutoAdvance
            };
            self.timers.schedule_after(
                self.services.clock.now(),
                self.definition.success_delay_ms,
                action,
            );
        }
        self.sync_gates();
        Ok(judgement)
    }

    /// Routes a raw pointer event to the strategy's gesture. Returns the
    /// judgement when the gesture produced an input.
    ///
    /// # Errors
    ///
    /// See [`MountedGame::submit`].
    pub fn pointer(
        &mut self,
        event: &mut PointerEvent,
        correlation_id: Uuid,
    ) -> Result<Option<Judgement>, DomainError> {
        if self.game.phase() != MiniGamePhase::Playing {
            return Ok(None);
        }
        let input = match self.game.condition() {
            WinCondition::DragToTarget { items } => {
                let items = items.clone();
                self.drag.handle(event, |id| {
                    items.iter().find(|i| &i.id == id).map(|i| i.origin.y)
                })
            }
            WinCondition::ToleranceBand { .. } => {
                self.slider.as_mut().and_then(|slider| slider.handle(event))
            }
            _ => match &event.target {
                PointerTarget::Item(id) if event.phase == PointerPhase::Down => {
                    let input = PlayerInput::Choose { option: id.clone() };
                    event.stop_propagation();
                    Some(input)
                }
                _ => None,
            },
        };
        input
            .map(|input| self.submit(input, correlation_id))
            .transpose()
    }

    /// The primary action of whichever gate is open.
    ///
    /// # Errors
    ///
    /// Returns a journal error.
    pub fn press_primary(&mut self, correlation_id: Uuid) -> Result<GameSignal, DomainError> {
        let Some((gate, dialog)) = self.open_gate() else {
            return Ok(GameSignal::Continue);
        };
        if !dialog.acknowledge() {
            return Ok(GameSignal::Continue);
        }
        let game_id = self.game.id;
        let clock = &*self.services.clock;
        let journal = &*self.services.journal;

        let signal = match gate {
            OpenGate::Help => {
                let command = DismissHelp { correlation_id, game_id };
                handle_dismiss_help(&command, &mut self.game, clock, journal)?;
                GameSignal::Continue
            }
            OpenGate::Error => {
                let command = AcknowledgeError { correlation_id, game_id };
                handle_acknowledge_error(&command, &mut self.game, clock, journal)?;
                GameSignal::Continue
            }
            OpenGate::Success => {
                let command = AcknowledgeSuccess { correlation_id, game_id };
                if handle_acknowledge_success(&command, &mut self.game, clock, journal)? {
                    GameSignal::Finished
                } else {
                    GameSignal::Continue
                }
            }
        };
        self.sync_gates();
        Ok(signal)
    }

    /// Fires due timers.
    ///
    /// # Errors
    ///
    /// Returns a journal error.
    pub fn tick(&mut self, correlation_id: Uuid) -> Result<GameSignal, DomainError> {
        let mut signal = GameSignal::Continue;
        for timer in self.timers.due(self.services.clock.now()) {
            match timer {
                GameTimer::OpenSuccessGate => {
                    debug!(game = %self.definition.key, "success dialog due");
                    self.success_shown = true;
                }
                GameTimer::AutoAdvance => {
                    let command = AcknowledgeSuccess {
                        correlation_id,
                        game_id: self.game.id,
                    };
                    if handle_acknowledge_success(
                        &command,
                        &mut self.game,
                        &*self.services.clock,
                        &*self.services.journal,
                    )? {
                        signal = GameSignal::Finished;
                    }
                }
            }
        }
        self.sync_gates();
        Ok(signal)
    }

    /// Manual trigger for narration the runtime refused to autoplay.
    pub fn replay_narration(&mut self) -> NarratorState {
        if let Some(help) = self.help.as_mut().filter(|g| g.is_open()) {
            return help.replay_narration();
        }
        if self.error.is_open() {
            return self.error.replay_narration();
        }
        if let Some(success) = self.success.as_mut().filter(|g| g.is_open()) {
            return success.replay_narration();
        }
        self.cue.play_on_gesture()
    }

    /// Host callback: playback for `owner` reached its end. Returns whether
    /// the owner belongs to this game.
    pub fn narration_ended(&mut self, owner: OwnerId) -> bool {
        let gates = self
            .help
            .iter_mut()
            .chain(self.success.iter_mut())
            .chain(std::iter::once(&mut self.error));
        for gate in gates {
            let narrator = gate.narrator_mut();
            if narrator.id() == owner {
                narrator.on_ended();
                return true;
            }
        }
        if self.cue.id() == owner {
            self.cue.on_ended();
            return true;
        }
        false
    }

    /// Tears the game down: pending timers are cancelled and every narrator
    /// it owns is stopped and unregistered.
    pub fn unmount(mut self) {
        let cancelled = self.timers.len();
        self.timers.cancel_all();
        debug!(game = %self.definition.key, cancelled, "mini-game unmounted");
    }
}

#[cfg(test)]
mod tests {
    use powerskills_core::journal::InMemoryJournal;
    use powerskills_narration::{GateContent, NarrationContent, Tone};
    use powerskills_test_support::{ManualClock, RecordingSpeechBackend, SpeechCall};

    use super::*;
    use crate::domain::input::Point3;
    use crate::domain::win_condition::DragItem;

    struct Harness {
        arbitrator: NarrationArbitrator,
        speech: Arc<RecordingSpeechBackend>,
        clock: Arc<ManualClock>,
        journal: Arc<InMemoryJournal>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                arbitrator: NarrationArbitrator::new(),
                speech: Arc::new(RecordingSpeechBackend::new()),
                clock: Arc::new(ManualClock::at_epoch()),
                journal: Arc::new(InMemoryJournal::new()),
            }
        }

        fn services(&self) -> GameServices {
            GameServices {
                arbitrator: self.arbitrator.clone(),
                speech: self.speech.clone(),
                clock: self.clock.clone(),
                journal: self.journal.clone(),
            }
        }

        fn mount(&self, definition: &MiniGameDefinition) -> MountedGame {
            MountedGame::mount(definition, &self.services(), Uuid::new_v4()).unwrap()
        }
    }

    fn gate(tone: Tone, title: &str, narration: Option<NarrationContent>) -> GateContent {
        GateContent {
            tone,
            title: title.to_owned(),
            body: String::new(),
            primary_label: "Continuar".to_owned(),
            narration,
        }
    }

    fn option(id: &str, correct: bool, cue: Option<&str>) -> SelectionOption {
        SelectionOption {
            id: OptionId::new(id),
            label: id.to_owned(),
            correct,
            cue: cue.map(str::to_owned),
            hint: None,
        }
    }

    fn compass() -> MiniGameDefinition {
        MiniGameDefinition {
            key: "compass-pickup".to_owned(),
            title: "Brújula".to_owned(),
            condition: WinCondition::SetCompletion {
                options: vec![option("compass", true, None)],
            },
            help: Some(gate(
                Tone::Info,
                "Juego: Brújula Power Skills",
                Some(NarrationContent::recorded("/audio/03-compass-help.mp3")),
            )),
            error: None,
            success: Some(gate(
                Tone::Success,
                "¡Bien hecho!",
                Some(NarrationContent::recorded("/audio/04-compass-win.mp3")),
            )),
            success_delay_ms: 400,
            cue_lang: "es-ES".to_owned(),
        }
    }

    fn action_select() -> MiniGameDefinition {
        MiniGameDefinition {
            key: "action-select".to_owned(),
            title: "Power Skills en acción".to_owned(),
            condition: WinCondition::SetCompletion {
                options: vec![
                    option("comunicacion", true, Some("Comunicación efectiva")),
                    option("ruido", false, None),
                ],
            },
            help: None,
            error: Some(GateContent {
                body: "“{label}” no corresponde a una Power Skill.".to_owned(),
                narration: Some(NarrationContent::spoken("“{label}” no corresponde.")),
                ..gate(Tone::Warning, "Ups", None)
            }),
            success: None,
            success_delay_ms: 350,
            cue_lang: "es-ES".to_owned(),
        }
    }

    #[test]
    fn test_mount_opens_help_and_plays_its_narration() {
        // Arrange
        let harness = Harness::new();

        // Act
        let game = harness.mount(&compass());

        // Assert
        assert_eq!(game.phase(), MiniGamePhase::Help);
        let (which, dialog) = game.open_gate().unwrap();
        assert_eq!(which, OpenGate::Help);
        assert_eq!(dialog.narration_state(), NarratorState::Playing);
        assert_eq!(
            harness.speech.started(),
            vec![NarrationContent::recorded("/audio/03-compass-help.mp3")]
        );
    }

    fn last_started_owner(speech: &RecordingSpeechBackend) -> Option<OwnerId> {
        speech.calls().into_iter().rev().find_map(|call| match call {
            SpeechCall::Start(owner, _) => Some(owner),
            SpeechCall::Stop(_) => None,
        })
    }

    #[test]
    fn test_narration_ended_releases_the_help_gate() {
        // Arrange
        let harness = Harness::new();
        let mut game = harness.mount(&compass());
        let owner = last_started_owner(&harness.speech).unwrap();

        // Act
        let stranger = game.narration_ended(OwnerId::new());
        let routed = game.narration_ended(owner);

        // Assert
        assert!(!stranger);
        assert!(routed);
        let (_, dialog) = game.open_gate().unwrap();
        assert_eq!(dialog.narration_state(), NarratorState::Idle);
        assert_eq!(harness.arbitrator.active(), None);
    }

    #[test]
    fn test_narration_ended_reaches_the_option_cue() {
        // Arrange
        let harness = Harness::new();
        let mut game = harness.mount(&action_select());
        game.submit(PlayerInput::choose("comunicacion"), Uuid::new_v4())
            .unwrap();
        let owner = last_started_owner(&harness.speech).unwrap();

        // Act
        let routed = game.narration_ended(owner);

        // Assert
        assert!(routed);
        assert_eq!(game.cue_state(), NarratorState::Idle);
        assert_eq!(game.pending_timers(), 1);
    }

    #[test]
    fn test_success_gate_opens_after_delay_and_finishes_once() {
        // Arrange
        let harness = Harness::new();
        let mut game = harness.mount(&compass());
        game.press_primary(Uuid::new_v4()).unwrap();

        // Act
        let judgement = game
            .submit(PlayerInput::choose("compass"), Uuid::new_v4())
            .unwrap();
        let before_delay = game.open_gate().map(|(g, _)| g);
        harness.clock.advance_ms(400);
        game.tick(Uuid::new_v4()).unwrap();
        let after_delay = game.open_gate().map(|(g, _)| g);
        let first = game.press_primary(Uuid::new_v4()).unwrap();
        let second = game.press_primary(Uuid::new_v4()).unwrap();

        // Assert
        assert_eq!(judgement, Judgement::Completed);
        assert_eq!(before_delay, None);
        assert_eq!(after_delay, Some(OpenGate::Success));
        assert_eq!(first, GameSignal::Finished);
        assert_eq!(second, GameSignal::Continue);
        assert!(game.open_gate().is_none());
    }

    #[test]
    fn test_error_gate_fills_label_and_retry_keeps_progress() {
        // Arrange
        let harness = Harness::new();
        let mut game = harness.mount(&action_select());

        // Act
        game.submit(PlayerInput::choose("ruido"), Uuid::new_v4())
            .unwrap();
        let (which, dialog) = game.open_gate().unwrap();
        let body = dialog.content().body.clone();
        let signal = game.press_primary(Uuid::new_v4()).unwrap();

        // Assert
        assert_eq!(which, OpenGate::Error);
        assert_eq!(body, "“ruido” no corresponde a una Power Skill.");
        assert_eq!(
            harness.speech.started().last(),
            Some(&NarrationContent::spoken("“ruido” no corresponde."))
        );
        assert_eq!(signal, GameSignal::Continue);
        assert_eq!(game.phase(), MiniGamePhase::Playing);
        assert!(game.open_gate().is_none());
    }

    #[test]
    fn test_game_without_success_gate_auto_advances() {
        // Arrange
        let harness = Harness::new();
        let mut game = harness.mount(&action_select());
        game.submit(PlayerInput::choose("comunicacion"), Uuid::new_v4())
            .unwrap();

        // Act
        let early = game.tick(Uuid::new_v4()).unwrap();
        harness.clock.advance_ms(350);
        let due = game.tick(Uuid::new_v4()).unwrap();

        // Assert
        assert_eq!(early, GameSignal::Continue);
        assert_eq!(due, GameSignal::Finished);
        assert_eq!(
            harness.speech.started().first(),
            Some(&NarrationContent::spoken("Comunicación efectiva"))
        );
    }

    #[test]
    fn test_unmount_cancels_timers_and_silences_narration() {
        // Arrange
        let harness = Harness::new();
        let mut game = harness.mount(&action_select());
        game.submit(PlayerInput::choose("comunicacion"), Uuid::new_v4())
            .unwrap();
        assert_eq!(game.pending_timers(), 1);
        assert_eq!(game.cue_state(), NarratorState::Playing);

        // Act
        game.unmount();

        // Assert
        assert!(harness.speech.audible().is_empty());
        assert_eq!(harness.arbitrator.registered_count(), 0);
        assert_eq!(harness.arbitrator.active(), None);
        assert!(matches!(harness.speech.calls().last(), Some(SpeechCall::Stop(_))));
    }

    #[test]
    fn test_pointer_drag_routes_through_drop() {
        // Arrange
        let harness = Harness::new();
        let definition = MiniGameDefinition {
            key: "results".to_owned(),
            title: "Resultados".to_owned(),
            condition: WinCondition::DragToTarget {
                items: vec![DragItem {
                    id: OptionId::new("eficiencia"),
                    label: "Eficiencia".to_owned(),
                    origin: Point3::new(-2.8, 0.2, 1.2),
                    target: Point3::new(-2.8, 0.2, -0.9),
                    hit_radius: 0.35,
                    hint: None,
                }],
            },
            help: None,
            error: None,
            success: Some(gate(Tone::Success, "¡Excelente!", None)),
            success_delay_ms: 300,
            cue_lang: "es-ES".to_owned(),
        };
        let mut game = harness.mount(&definition);
        let mut down = PointerEvent::new(
            PointerPhase::Down,
            PointerTarget::Item("eficiencia".into()),
            Point3::new(-2.8, 0.2, 1.2),
        );
        let mut up = PointerEvent::new(
            PointerPhase::Up,
            PointerTarget::Background,
            Point3::new(-2.8, 0.0, -0.8),
        );

        // Act
        let pressed = game.pointer(&mut down, Uuid::new_v4()).unwrap();
        let released = game.pointer(&mut up, Uuid::new_v4()).unwrap();

        // Assert
        assert_eq!(pressed, None);
        assert_eq!(released, Some(Judgement::Completed));
        assert!(up.is_propagation_stopped());
    }

    #[test]
    fn test_exhaustive_revisit_replays_cue() {
        let harness = Harness::new();
        let definition = MiniGameDefinition {
            key: "team-explore".to_owned(),
            title: "Equipo".to_owned(),
            condition: WinCondition::ExhaustiveVisit {
                options: vec![
                    option("empatia", false, Some("Empatía")),
                    option("estrategia", false, Some("Estrategia")),
                ],
            },
            help: None,
            error: None,
            success: None,
            success_delay_ms: 600,
            cue_lang: "es-ES".to_owned(),
        };
        let mut game = harness.mount(&definition);

        game.submit(PlayerInput::choose("empatia"), Uuid::new_v4())
            .unwrap();
        let again = game
            .submit(PlayerInput::choose("empatia"), Uuid::new_v4())
            .unwrap();

        assert_eq!(again, Judgement::Ignored);
        assert_eq!(harness.speech.started().len(), 2);
    }
}
