//! Command handlers for the Scenes context.
//!
//! Each handler executes one command against the live journey aggregate and
//! appends the resulting events to the journal.

use powerskills_core::aggregate::AggregateRoot;
use powerskills_core::clock::Clock;
use powerskills_core::command::ensure_target;
use powerskills_core::error::DomainError;
use powerskills_core::journal::{EventJournal, StoredEvent};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::aggregates::JourneyProgress;
use crate::domain::commands::{
    AcknowledgeBriefing, CompleteScene, EnterScene, FinishIntro, OpenExternalLink,
    RecordIntroStart, RestartJourney, StartJourney,
};
use crate::domain::events::{JourneyEvent, JourneyEventKind};

fn commit(journey: &mut JourneyProgress, journal: &dyn EventJournal) -> Result<(), DomainError> {
    let stored = journey.take_stored_events();
    journal.append(&stored)
}

/// Reconstitutes a `JourneyProgress` from journaled events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub fn reconstitute(
    journey_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<JourneyProgress, DomainError> {
    let mut journey = JourneyProgress::new(journey_id);
    for stored in existing_events
        .iter()
        .filter(|stored| stored.aggregate_id == journey_id)
    {
        let kind: JourneyEventKind =
            serde_json::from_value(stored.payload.clone()).map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        let event = JourneyEvent {
            metadata: stored.metadata(),
            kind,
        };
        journey.apply(&event);
    }
    Ok(journey)
}

/// Handles `StartJourney`.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the journey already started, or a
/// journal error.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
pub fn handle_start_journey(
    command: &StartJourney,
    journey: &mut JourneyProgress,
    clock: &dyn Clock,
    journal: &dyn EventJournal,
) -> Result<(), DomainError> {
    ensure_target(command, journey)?;
    journey.start(&command.title, &command.digest, command.correlation_id, clock)?;
    commit(journey, journal)?;
    info!(title = %command.title, digest = %command.digest, "journey started");
    Ok(())
}

/// Handles `EnterScene`.
///
/// # Errors
///
/// Returns `DomainError::Validation` before the journey starts, or a journal
/// error.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, scene = %command.scene))]
pub fn handle_enter_scene(
    command: &EnterScene,
    journey: &mut JourneyProgress,
    clock: &dyn Clock,
    journal: &dyn EventJournal,
) -> Result<(), DomainError> {
    ensure_target(command, journey)?;
    journey.enter_scene(
        command.scene,
        command.briefings,
        command.has_media,
        command.correlation_id,
        clock,
    )?;
    commit(journey, journal)?;
    info!(step = ?journey.step(), "scene entered");
    Ok(())
}

/// Handles `AcknowledgeBriefing`. Returns whether a briefing was on screen.
///
/// # Errors
///
/// Returns `DomainError` if the command targets another journey or the
/// journal rejects the events.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, scene = %journey.scene()))]
pub fn handle_acknowledge_briefing(
    command: &AcknowledgeBriefing,
    journey: &mut JourneyProgress,
    clock: &dyn Clock,
    journal: &dyn EventJournal,
) -> Result<bool, DomainError> {
    ensure_target(command, journey)?;
    let acknowledged = journey.acknowledge_briefing(command.correlation_id, clock);
    commit(journey, journal)?;
    if acknowledged {
        debug!(step = ?journey.step(), "briefing acknowledged");
    }
    Ok(acknowledged)
}

/// Handles `RecordIntroStart`. Returns whether the outcome was recorded.
///
/// # Errors
///
/// Returns `DomainError` if the command targets another journey or the
/// journal rejects the events.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, scene = %journey.scene()))]
pub fn handle_record_intro_start(
    command: &RecordIntroStart,
    journey: &mut JourneyProgress,
    clock: &dyn Clock,
    journal: &dyn EventJournal,
) -> Result<bool, DomainError> {
    ensure_target(command, journey)?;
    let recorded =
        journey.record_intro_start(&command.src, command.blocked, command.correlation_id, clock);
    commit(journey, journal)?;
    if recorded && command.blocked {
        warn!(src = %command.src, "intro video blocked, manual play offered");
    } else if recorded {
        debug!(src = %command.src, "intro video playing");
    }
    Ok(recorded)
}

/// Handles `FinishIntro`. Returns whether the intro ended.
///
/// # Errors
///
/// Returns `DomainError` if the command targets another journey or the
/// journal rejects the events.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, scene = %journey.scene()))]
pub fn handle_finish_intro(
    command: &FinishIntro,
    journey: &mut JourneyProgress,
    clock: &dyn Clock,
    journal: &dyn EventJournal,
) -> Result<bool, DomainError> {
    ensure_target(command, journey)?;
    let finished = journey.finish_intro(command.skipped, command.correlation_id, clock);
    commit(journey, journal)?;
    if finished {
        debug!(skipped = command.skipped, "intro finished");
    }
    Ok(finished)
}

/// Handles `CompleteScene`.
///
/// # Errors
///
/// Returns `DomainError::Validation` unless a game stage is mounted, or a
/// journal error.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, scene = %journey.scene()))]
pub fn handle_complete_scene(
    command: &CompleteScene,
    journey: &mut JourneyProgress,
    clock: &dyn Clock,
    journal: &dyn EventJournal,
) -> Result<(), DomainError> {
    ensure_target(command, journey)?;
    journey.complete_scene(&command.game, command.correlation_id, clock)?;
    commit(journey, journal)?;
    info!(game = %command.game, completed = journey.completed_scenes(), "scene completed");
    Ok(())
}

/// Handles `RestartJourney`.
///
/// # Errors
///
/// Returns `DomainError::Validation` anywhere but the credits, or a journal
/// error.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
pub fn handle_restart_journey(
    command: &RestartJourney,
    journey: &mut JourneyProgress,
    clock: &dyn Clock,
    journal: &dyn EventJournal,
) -> Result<(), DomainError> {
    ensure_target(command, journey)?;
    journey.restart(command.correlation_id, clock)?;
    commit(journey, journal)?;
    info!(restarts = journey.restarts(), "journey restarted");
    Ok(())
}

/// Handles `OpenExternalLink`.
///
/// # Errors
///
/// Returns `DomainError::Validation` anywhere but the credits, or a journal
/// error.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
pub fn handle_open_external_link(
    command: &OpenExternalLink,
    journey: &mut JourneyProgress,
    clock: &dyn Clock,
    journal: &dyn EventJournal,
) -> Result<(), DomainError> {
    ensure_target(command, journey)?;
    journey.open_link(&command.url, command.correlation_id, clock)?;
    commit(journey, journal)?;
    info!(url = %command.url, "external link opened");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use powerskills_content::SceneKey;
    use powerskills_core::journal::InMemoryJournal;
    use powerskills_test_support::FixedClock;

    use super::*;
    use crate::domain::aggregates::{IntroStep, MediaState};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    fn start(journey: &mut JourneyProgress, journal: &InMemoryJournal) {
        let command = StartJourney {
            correlation_id: Uuid::new_v4(),
            journey_id: journey.id,
            title: "Viaje".to_owned(),
            digest: "abc".to_owned(),
        };
        handle_start_journey(&command, journey, &clock(), journal).unwrap();
    }

    #[test]
    fn test_handlers_journal_intro_flow() {
        // Arrange
        let journal = InMemoryJournal::new();
        let mut journey = JourneyProgress::new(Uuid::new_v4());
        let journey_id = journey.id;
        let correlation_id = Uuid::new_v4();
        start(&mut journey, &journal);

        // Act
        handle_enter_scene(
            &EnterScene {
                correlation_id,
                journey_id,
                scene: SceneKey::Welcome,
                briefings: 1,
                has_media: true,
            },
            &mut journey,
            &clock(),
            &journal,
        )
        .unwrap();
        handle_acknowledge_briefing(
            &AcknowledgeBriefing { correlation_id, journey_id },
            &mut journey,
            &clock(),
            &journal,
        )
        .unwrap();
        handle_record_intro_start(
            &RecordIntroStart {
                correlation_id,
                journey_id,
                src: "/videos/01-bienvenida.mp4".to_owned(),
                blocked: true,
            },
            &mut journey,
            &clock(),
            &journal,
        )
        .unwrap();

        // Assert
        assert_eq!(journey.step(), IntroStep::Media(MediaState::Blocked));
        assert_eq!(
            journal.event_types(),
            vec![
                "journey.started",
                "journey.scene_entered",
                "journey.briefing_acknowledged",
                "journey.intro_started"
            ]
        );
        assert!(journey.uncommitted_events().is_empty());
    }

    #[test]
    fn test_noop_commands_journal_nothing() {
        // Arrange
        let journal = InMemoryJournal::new();
        let mut journey = JourneyProgress::new(Uuid::new_v4());
        let journey_id = journey.id;
        start(&mut journey, &journal);

        // Act
        let finished = handle_finish_intro(
            &FinishIntro {
                correlation_id: Uuid::new_v4(),
                journey_id,
                skipped: true,
            },
            &mut journey,
            &clock(),
            &journal,
        )
        .unwrap();

        // Assert
        assert!(!finished);
        assert_eq!(journal.event_types(), vec!["journey.started"]);
    }

    #[test]
    fn test_command_for_another_journey_is_rejected() {
        let journal = InMemoryJournal::new();
        let mut journey = JourneyProgress::new(Uuid::new_v4());

        let result = handle_start_journey(
            &StartJourney {
                correlation_id: Uuid::new_v4(),
                journey_id: Uuid::new_v4(),
                title: "Viaje".to_owned(),
                digest: "abc".to_owned(),
            },
            &mut journey,
            &clock(),
            &journal,
        );

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(!journey.is_started());
    }

    #[test]
    fn test_reconstitute_replays_journal() {
        // Arrange
        let journal = InMemoryJournal::new();
        let mut journey = JourneyProgress::new(Uuid::new_v4());
        let journey_id = journey.id;
        start(&mut journey, &journal);
        handle_enter_scene(
            &EnterScene {
                correlation_id: Uuid::new_v4(),
                journey_id,
                scene: SceneKey::Team,
                briefings: 0,
                has_media: false,
            },
            &mut journey,
            &clock(),
            &journal,
        )
        .unwrap();

        // Act
        let replayed = reconstitute(journey_id, &journal.events()).unwrap();

        // Assert
        assert_eq!(replayed.scene(), SceneKey::Team);
        assert_eq!(replayed.step(), IntroStep::Stage);
        assert_eq!(replayed.digest(), Some("abc"));
        assert_eq!(replayed.version(), 2);
    }

    #[test]
    fn test_reconstitute_reports_corrupt_payload() {
        let journey_id = Uuid::new_v4();
        let stored = StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id: journey_id,
            event_type: "journey.started".to_owned(),
            payload: serde_json::json!({"Started": {"title": 3}}),
            sequence_number: 1,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        };

        let result = reconstitute(journey_id, &[stored]);

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
