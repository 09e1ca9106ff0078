//! Recording projection handler for dispatcher and repository tests.

use std::marker::PhantomData;
use std::sync::Mutex;

use stockroom_core::error::DomainError;
use stockroom_core::event::DomainEvent;
use stockroom_core::projection::ProjectionHandler;
use uuid::Uuid;

/// A projection that records `(aggregate_id, sequence_number, event_type)`
/// for every event it receives.
#[derive(Debug)]
pub struct RecordingProjection<E> {
    name: &'static str,
    event_types: &'static [&'static str],
    fail_on: Option<&'static str>,
    seen: Mutex<Vec<(Uuid, i64, &'static str)>>,
    _event: PhantomData<fn(&E)>,
}

impl<E> RecordingProjection<E> {
    /// Create a projection subscribed to `event_types`.
    #[must_use]
    pub fn new(name: &'static str, event_types: &'static [&'static str]) -> Self {
        Self {
            name,
            event_types,
            fail_on: None,
            seen: Mutex::new(Vec::new()),
            _event: PhantomData,
        }
    }

    /// Makes the projection fail with `ProjectionInconsistency` whenever it
    /// receives an event of `event_type`. The failing event is still
    /// recorded.
    #[must_use]
    pub fn failing_on(mut self, event_type: &'static str) -> Self {
        self.fail_on = Some(event_type);
        self
    }

    /// Returns a snapshot of every event received, in delivery order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seen(&self) -> Vec<(Uuid, i64, &'static str)> {
        self.seen.lock().unwrap().clone()
    }
}

impl<E: DomainEvent> ProjectionHandler<E> for RecordingProjection<E> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn event_types(&self) -> &'static [&'static str] {
        self.event_types
    }

    fn handle(&self, event: &E) -> Result<(), DomainError> {
        let event_type = event.event_type();
        self.seen
            .lock()
            .unwrap()
            .push((event.aggregate_id(), event.sequence_number(), event_type));
        if self.fail_on == Some(event_type) {
            return Err(DomainError::ProjectionInconsistency {
                projection: self.name,
                aggregate_id: event.aggregate_id(),
                reason: format!("refusing {event_type}"),
            });
        }
        Ok(())
    }
}
