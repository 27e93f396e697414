//! Command handlers for the Mini-Game context.
//!
//! Each handler executes one command against a live aggregate and appends
//! the resulting events to the journal.

use powerskills_core::aggregate::AggregateRoot;
use powerskills_core::clock::Clock;
use powerskills_core::command::ensure_target;
use powerskills_core::error::DomainError;
use powerskills_core::journal::{EventJournal, StoredEvent};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::aggregates::MiniGame;
use crate::domain::commands::{AcknowledgeError, AcknowledgeSuccess, DismissHelp, SubmitInput};
use crate::domain::events::{MiniGameEvent, MiniGameEventKind};
use crate::domain::win_condition::{Judgement, WinCondition};

fn commit(game: &mut MiniGame, journal: &dyn EventJournal) -> Result<Vec<StoredEvent>, DomainError> {
    let stored = game.take_stored_events();
    journal.append(&stored)?;
    Ok(stored)
}

/// Reconstitutes a `MiniGame` from journaled events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub fn reconstitute(
    game_id: Uuid,
    key: &str,
    condition: WinCondition,
    existing_events: &[StoredEvent],
) -> Result<MiniGame, DomainError> {
    let mut game = MiniGame::new(game_id, key, condition);
    for stored in existing_events
        .iter()
        .filter(|stored| stored.aggregate_id == game_id)
    {
        let kind: MiniGameEventKind =
            serde_json::from_value(stored.payload.clone()).map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        let event = MiniGameEvent {
            metadata: stored.metadata(),
            kind,
        };
        game.apply(&event);
    }
    Ok(game)
}

/// Handles `DismissHelp`. Returns whether the game left the help phase.
///
/// # Errors
///
/// Returns `DomainError` if the command targets another game or the journal
/// rejects the events.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, game = %game.key()))]
pub fn handle_dismiss_help(
    command: &DismissHelp,
    game: &mut MiniGame,
    clock: &dyn Clock,
    journal: &dyn EventJournal,
) -> Result<bool, DomainError> {
    ensure_target(command, game)?;
    let dismissed = game.dismiss_help(command.correlation_id, clock);
    commit(game, journal)?;
    if dismissed {
        debug!("help dismissed");
    }
    Ok(dismissed)
}

/// Handles `SubmitInput`. Returns the judgement of the input.
///
/// # Errors
///
/// Returns `DomainError::UnknownOption` or `DomainError::Validation` for
/// malformed input, or a journal error.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, game = %game.key()))]
pub fn handle_submit_input(
    command: &SubmitInput,
    game: &mut MiniGame,
    clock: &dyn Clock,
    journal: &dyn EventJournal,
) -> Result<Judgement, DomainError> {
    ensure_target(command, game)?;
    let judgement = game.submit_input(command.input.clone(), command.correlation_id, clock)?;
    commit(game, journal)?;
    match &judgement {
        Judgement::Completed => info!(input = ?command.input, "mini-game won"),
        Judgement::Rejected(rejection) => debug!(?rejection, "input rejected"),
        Judgement::Accepted | Judgement::Ignored => debug!(?judgement, "input judged"),
    }
    Ok(judgement)
}

/// Handles `AcknowledgeError`. Returns whether play resumed.
///
/// # Errors
///
/// Returns `DomainError` if the command targets another game or the journal
/// rejects the events.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, game = %game.key()))]
pub fn handle_acknowledge_error(
    command: &AcknowledgeError,
    game: &mut MiniGame,
    clock: &dyn Clock,
    journal: &dyn EventJournal,
) -> Result<bool, DomainError> {
    ensure_target(command, game)?;
    let resumed = game.acknowledge_error(command.correlation_id, clock);
    commit(game, journal)?;
    Ok(resumed)
}

/// Handles `AcknowledgeSuccess`. Returns `true` exactly once per game.
///
/// # Errors
///
/// Returns `DomainError` if the command targets another game or the journal
/// rejects the events.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, game = %game.key()))]
pub fn handle_acknowledge_success(
    command: &AcknowledgeSuccess,
    game: &mut MiniGame,
    clock: &dyn Clock,
    journal: &dyn EventJournal,
) -> Result<bool, DomainError> {
    ensure_target(command, game)?;
    let won = game.acknowledge_success(command.correlation_id, clock);
    commit(game, journal)?;
    if won {
        info!("mini-game finished");
    }
    Ok(won)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use powerskills_core::journal::InMemoryJournal;
    use powerskills_test_support::FixedClock;

    use super::*;
    use crate::domain::aggregates::MiniGamePhase;
    use crate::domain::input::{OptionId, PlayerInput};
    use crate::domain::win_condition::SelectionOption;

    fn compass() -> WinCondition {
        WinCondition::SetCompletion {
            options: vec![SelectionOption {
                id: OptionId::new("compass"),
                label: "Brújula".to_owned(),
                correct: true,
                cue: None,
                hint: None,
            }],
        }
    }

    #[test]
    fn test_handlers_journal_every_transition() {
        // Arrange
        let game_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let fixed_now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let clock = FixedClock(fixed_now);
        let journal = InMemoryJournal::new();
        let mut game = MiniGame::new(game_id, "compass", compass());

        // Act
        handle_dismiss_help(&DismissHelp { correlation_id, game_id }, &mut game, &clock, &journal)
            .unwrap();
        let judgement = handle_submit_input(
            &SubmitInput {
                correlation_id,
                game_id,
                input: PlayerInput::choose("compass"),
            },
            &mut game,
            &clock,
            &journal,
        )
        .unwrap();
        let won = handle_acknowledge_success(
            &AcknowledgeSuccess { correlation_id, game_id },
            &mut game,
            &clock,
            &journal,
        )
        .unwrap();

        // Assert
        assert_eq!(judgement, Judgement::Completed);
        assert!(won);
        assert_eq!(
            journal.event_types(),
            vec![
                "minigame.help_dismissed",
                "minigame.won",
                "minigame.success_acknowledged"
            ]
        );
        let events = journal.events();
        assert_eq!(events[2].sequence_number, 3);
        assert_eq!(events[2].correlation_id, correlation_id);
        assert_eq!(events[2].occurred_at, fixed_now);
        assert!(game.uncommitted_events().is_empty());
    }

    #[test]
    fn test_command_for_another_game_is_rejected() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let journal = InMemoryJournal::new();
        let mut game = MiniGame::new(Uuid::new_v4(), "compass", compass());

        let result = handle_dismiss_help(
            &DismissHelp {
                correlation_id: Uuid::new_v4(),
                game_id: Uuid::new_v4(),
            },
            &mut game,
            &clock,
            &journal,
        );

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(game.phase(), MiniGamePhase::Help);
        assert!(journal.events().is_empty());
    }

    #[test]
    fn test_reconstitute_replays_journal() {
        // Arrange
        let game_id = Uuid::new_v4();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let journal = InMemoryJournal::new();
        let mut game = MiniGame::new(game_id, "compass", compass());
        handle_dismiss_help(
            &DismissHelp {
                correlation_id: Uuid::new_v4(),
                game_id,
            },
            &mut game,
            &clock,
            &journal,
        )
        .unwrap();

        // Act
        let replayed = reconstitute(game_id, "compass", compass(), &journal.events()).unwrap();

        // Assert
        assert_eq!(replayed.phase(), MiniGamePhase::Playing);
        assert_eq!(replayed.version(), 1);
    }

    #[test]
    fn test_reconstitute_reports_corrupt_payload() {
        let game_id = Uuid::new_v4();
        let stored = StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id: game_id,
            event_type: "minigame.won".to_owned(),
            payload: serde_json::json!({"Nope": {}}),
            sequence_number: 1,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        };

        let result = reconstitute(game_id, "compass", compass(), &[stored]);

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
