//! Aggregate root for the Mini-Game context.

use powerskills_core::aggregate::AggregateRoot;
use powerskills_core::clock::Clock;
use powerskills_core::error::DomainError;
use powerskills_core::event::EventMetadata;
use serde::Serialize;
use uuid::Uuid;

use super::events::{
    ErrorAcknowledged, HelpDismissed, InputAccepted, InputRejected, MiniGameEvent,
    MiniGameEventKind, SuccessAcknowledged, Won,
};
use super::input::PlayerInput;
use super::win_condition::{Judgement, Progress, Rejection, SelectionOption, WinCondition};

/// Phase of a mini-game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MiniGamePhase {
    /// Instructions are showing.
    #[default]
    Help,
    /// Accepting input.
    Playing,
    /// A wrong input is being reported.
    Error,
    /// The win condition held. Terminal.
    Success,
}

/// One mounted instance of a mini-game.
#[derive(Debug)]
pub struct MiniGame {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Definition key.
    pub(crate) key: String,
    pub(crate) condition: WinCondition,
    pub(crate) progress: Progress,
    pub(crate) phase: MiniGamePhase,
    pub(crate) last_rejection: Option<Rejection>,
    pub(crate) acknowledged: bool,
    /// Current version (event count).
    pub(crate) version: i64,
    uncommitted_events: Vec<MiniGameEvent>,
}

impl MiniGame {
    /// Creates a game in the help phase.
    #[must_use]
    pub fn new(id: Uuid, key: impl Into<String>, condition: WinCondition) -> Self {
        let progress = Progress::new(&condition);
        Self {
            id,
            key: key.into(),
            condition,
            progress,
            phase: MiniGamePhase::Help,
            last_rejection: None,
            acknowledged: false,
            version: 0,
            uncommitted_events: Vec::new(),
        }
    }

    /// Definition key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> MiniGamePhase {
        self.phase
    }

    /// The configured win condition.
    #[must_use]
    pub fn condition(&self) -> &WinCondition {
        &self.condition
    }

    /// Accumulated progress.
    #[must_use]
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// The rejection being reported, while in the error phase.
    #[must_use]
    pub fn last_rejection(&self) -> Option<&Rejection> {
        self.last_rejection.as_ref()
    }

    /// Whether the win has been acknowledged.
    #[must_use]
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// The selected option of a free-choice game.
    #[must_use]
    pub fn final_choice(&self) -> Option<&SelectionOption> {
        match &self.condition {
            WinCondition::FreeChoice { .. } => self
                .progress
                .chosen()
                .first()
                .and_then(|id| self.condition.option(id)),
            _ => None,
        }
    }

    fn record(&mut self, kind: MiniGameEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = MiniGameEvent {
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

    /// `Help → Playing`. Returns `false` (no-op) outside the help phase.
    pub fn dismiss_help(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        if self.phase != MiniGamePhase::Help {
            return false;
        }
        let kind = MiniGameEventKind::HelpDismissed(HelpDismissed {
            game: self.key.clone(),
        });
        self.record(kind, correlation_id, clock);
        true
    }

    /// Evaluates one input. Outside the playing phase the input is ignored
    /// and nothing is recorded.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownOption` or `DomainError::Validation` for
    /// inputs the configured strategy cannot interpret.
    pub fn submit_input(
        &mut self,
        input: PlayerInput,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Judgement, DomainError> {
        if self.phase != MiniGamePhase::Playing {
            return Ok(Judgement::Ignored);
        }
        let judgement = self.condition.judge(&self.key, &self.progress, &input)?;
        let game = self.key.clone();
        let kind = match &judgement {
            Judgement::Ignored => None,
            Judgement::Accepted => Some(MiniGameEventKind::InputAccepted(InputAccepted {
                game,
                input,
            })),
            Judgement::Rejected(rejection) => {
                Some(MiniGameEventKind::InputRejected(InputRejected {
                    game,
                    input,
                    rejection: rejection.clone(),
                }))
            }
            Judgement::Completed => Some(MiniGameEventKind::Won(Won { game, input })),
        };
        if let Some(kind) = kind {
            self.record(kind, correlation_id, clock);
        }
        Ok(judgement)
    }

    /// `Error → Playing`. Returns `false` (no-op) outside the error phase.
    pub fn acknowledge_error(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        if self.phase != MiniGamePhase::Error {
            return false;
        }
        let kind = MiniGameEventKind::ErrorAcknowledged(ErrorAcknowledged {
            game: self.key.clone(),
            progress_cleared: self.condition.clears_on_acknowledge(),
        });
        self.record(kind, correlation_id, clock);
        true
    }

    /// Acknowledges the win. Returns `true` exactly once per instance; that
    /// is the moment the owning scene may advance.
    pub fn acknowledge_success(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        if self.phase != MiniGamePhase::Success || self.acknowledged {
            return false;
        }
        let kind = MiniGameEventKind::SuccessAcknowledged(SuccessAcknowledged {
            game: self.key.clone(),
        });
        self.record(kind, correlation_id, clock);
        true
    }
}

impl AggregateRoot for MiniGame {
    type Event = MiniGameEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            MiniGameEventKind::HelpDismissed(_) => {
                self.phase = MiniGamePhase::Playing;
            }
            MiniGameEventKind::InputAccepted(payload) => {
                self.progress
                    .absorb(&self.condition, &payload.input, &Judgement::Accepted);
            }
            MiniGameEventKind::InputRejected(payload) => {
                let judgement = Judgement::Rejected(payload.rejection.clone());
                self.progress
                    .absorb(&self.condition, &payload.input, &judgement);
                self.last_rejection = Some(payload.rejection.clone());
                self.phase = MiniGamePhase::Error;
            }
            MiniGameEventKind::Won(payload) => {
                self.progress
                    .absorb(&self.condition, &payload.input, &Judgement::Completed);
                self.phase = MiniGamePhase::Success;
            }
            MiniGameEventKind::ErrorAcknowledged(payload) => {
                if payload.progress_cleared {
                    self.progress = Progress::new(&self.condition);
                }
                self.last_rejection = None;
                self.phase = MiniGamePhase::Playing;
            }
            MiniGameEventKind::SuccessAcknowledged(_) => {
                self.acknowledged = true;
            }
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
