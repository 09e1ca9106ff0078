//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for aggregate roots that reconstitute from event history.
///
/// Replaying the same stream prefix must always produce the same state.
pub trait AggregateRoot: Send + Sync + Sized {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent + Clone;

    /// Stable type name recorded on every stored event of this aggregate.
    const AGGREGATE_TYPE: &'static str;

    /// Creates the zero-value aggregate that events are folded into.
    fn new(id: Uuid) -> Self;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the persisted version (number of committed events applied).
    fn version(&self) -> i64;

    /// Applies a committed event during reconstitution and advances the
    /// version to the event's sequence number.
    fn apply(&mut self, event: &Self::Event);

    /// Returns uncommitted events produced by command handling.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Clears uncommitted events after they were appended and raises the
    /// version by the number of events cleared.
    fn mark_events_committed(&mut self);
}
