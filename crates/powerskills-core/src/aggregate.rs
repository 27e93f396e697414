//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;
use crate::journal::StoredEvent;

/// Trait for aggregates whose state is driven by recorded events.
///
/// Journey aggregates apply each event at the moment it is recorded, so
/// `version` counts every applied event, committed or not. Replaying the
/// same events through `apply` on a fresh instance yields the same state.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the current version (number of events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events recorded since the last drain.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Clears uncommitted events after they have been journaled.
    fn clear_uncommitted_events(&mut self);

    /// Converts the uncommitted events into journal records and clears them.
    fn take_stored_events(&mut self) -> Vec<StoredEvent> {
        let stored = self
            .uncommitted_events()
            .iter()
            .map(StoredEvent::from_event)
            .collect();
        self.clear_uncommitted_events();
        stored
    }
}
