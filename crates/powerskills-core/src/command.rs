//! Command abstractions.

use uuid::Uuid;

use crate::aggregate::AggregateRoot;
use crate::error::DomainError;

/// Trait that all player- or system-issued commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging).
    fn command_type(&self) -> &'static str;

    /// Correlation ID linking the command to the events it causes.
    fn correlation_id(&self) -> Uuid;

    /// The aggregate this command addresses.
    fn target_id(&self) -> Uuid;
}

/// Fails unless `command` addresses `aggregate`.
///
/// # Errors
///
/// Returns `DomainError::Validation` naming both identifiers.
pub fn ensure_target<C, A>(command: &C, aggregate: &A) -> Result<(), DomainError>
where
    C: Command + ?Sized,
    A: AggregateRoot + ?Sized,
{
    let target = command.target_id();
    let actual = aggregate.aggregate_id();
    if target == actual {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "{} for {target} sent to {actual}",
            command.command_type()
        )))
    }
}
