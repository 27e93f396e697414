//! Ephemeral event journal.
//!
//! Every state transition of a journey is recorded here for the lifetime of
//! the process. Nothing is written to disk; a restart of the program starts
//! an empty journal.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DomainError;
use crate::event::{DomainEvent, EventMetadata};

/// Journal representation of a domain event.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Aggregate this event belongs to.
    pub aggregate_id: Uuid,
    /// Event type name.
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Sequence number within the aggregate stream.
    pub sequence_number: i64,
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Causation ID linking to the causing command.
    pub causation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

impl StoredEvent {
    /// Converts a domain event into its journal record.
    pub fn from_event<E: DomainEvent>(event: &E) -> Self {
        let meta = event.metadata();
        Self {
            event_id: meta.event_id,
            aggregate_id: meta.aggregate_id,
            event_type: event.event_type().to_owned(),
            payload: event.to_payload(),
            sequence_number: meta.sequence_number,
            correlation_id: meta.correlation_id,
            causation_id: meta.causation_id,
            occurred_at: meta.occurred_at,
        }
    }

    /// Rebuilds the metadata the event was recorded with.
    #[must_use]
    pub fn metadata(&self) -> EventMetadata {
        EventMetadata {
            event_id: self.event_id,
            event_type: self.event_type.clone(),
            aggregate_id: self.aggregate_id,
            sequence_number: self.sequence_number,
            correlation_id: self.correlation_id,
            causation_id: self.causation_id,
            occurred_at: self.occurred_at,
        }
    }
}

/// Append-only sink for the events of a running journey.
pub trait EventJournal: Send + Sync {
    /// Appends events in the order given.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the journal cannot accept
    /// the events.
    fn append(&self, events: &[StoredEvent]) -> Result<(), DomainError>;

    /// Returns a snapshot of every event appended so far.
    fn events(&self) -> Vec<StoredEvent>;
}

/// Journal that keeps events in memory for the current process.
#[derive(Debug, Default)]
pub struct InMemoryJournal {
    events: Mutex<Vec<StoredEvent>>,
}

impl InMemoryJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the event type names in append order.
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }
}

impl EventJournal for InMemoryJournal {
    fn append(&self, events: &[StoredEvent]) -> Result<(), DomainError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(events);
        Ok(())
    }

    fn events(&self) -> Vec<StoredEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde::Serialize;

    use super::*;

    #[derive(Debug, Serialize)]
    struct Probe {
        value: u32,
    }

    #[derive(Debug)]
    struct ProbeEvent {
        metadata: EventMetadata,
        probe: Probe,
    }

    impl DomainEvent for ProbeEvent {
        fn event_type(&self) -> &'static str {
            "test.probe"
        }

        fn to_payload(&self) -> serde_json::Value {
            serde_json::to_value(&self.probe).unwrap()
        }

        fn metadata(&self) -> &EventMetadata {
            &self.metadata
        }
    }

    #[test]
    fn test_from_event_copies_metadata_and_payload() {
        // Arrange
        let aggregate_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let occurred_at = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let event = ProbeEvent {
            metadata: EventMetadata::caused_by(
                "test.probe",
                aggregate_id,
                3,
                correlation_id,
                occurred_at,
            ),
            probe: Probe { value: 7 },
        };

        // Act
        let stored = StoredEvent::from_event(&event);

        // Assert
        assert_eq!(stored.event_type, "test.probe");
        assert_eq!(stored.aggregate_id, aggregate_id);
        assert_eq!(stored.sequence_number, 3);
        assert_eq!(stored.correlation_id, correlation_id);
        assert_eq!(stored.causation_id, correlation_id);
        assert_eq!(stored.occurred_at, occurred_at);
        assert_eq!(stored.payload["value"], 7);
        assert_eq!(stored.metadata().event_id, event.metadata.event_id);
    }

    #[test]
    fn test_in_memory_journal_preserves_append_order() {
        // Arrange
        let journal = InMemoryJournal::new();
        let occurred_at = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let make = |event_type: &str, seq: i64| StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id: Uuid::nil(),
            event_type: event_type.to_owned(),
            payload: serde_json::Value::Null,
            sequence_number: seq,
            correlation_id: Uuid::nil(),
            causation_id: Uuid::nil(),
            occurred_at,
        };

        // Act
        journal.append(&[make("a", 1), make("b", 2)]).unwrap();
        journal.append(&[make("c", 3)]).unwrap();

        // Assert
        assert_eq!(journal.event_types(), vec!["a", "b", "c"]);
        assert_eq!(journal.events().len(), 3);
    }
}
