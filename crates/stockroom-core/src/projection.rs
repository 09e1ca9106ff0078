//! Projection handler contract and the synchronous event dispatcher.
//!
//! Committed events are handed to the dispatcher by the repository before
//! `save` returns. The dispatcher walks events in commit order and, for each
//! event, every interested handler in registration order.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error};

use crate::error::DomainError;
use crate::event::DomainEvent;

/// A read-side handler that keeps one view up to date.
pub trait ProjectionHandler<E>: Send + Sync {
    /// Stable name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Event type tags this handler wants to receive.
    fn event_types(&self) -> &'static [&'static str];

    /// Applies one committed event to the view.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProjectionInconsistency` when the view does not
    /// hold the record the event expects.
    fn handle(&self, event: &E) -> Result<(), DomainError>;
}

/// Fans committed events out to registered projection handlers.
pub struct EventDispatcher<E> {
    handlers: Vec<Arc<dyn ProjectionHandler<E>>>,
}

impl<E: DomainEvent> EventDispatcher<E> {
    /// Creates a dispatcher with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Registers a handler after all previously registered ones.
    pub fn register(&mut self, handler: Arc<dyn ProjectionHandler<E>>) {
        self.handlers.push(handler);
    }

    /// Builder-style variant of [`register`](Self::register).
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn ProjectionHandler<E>>) -> Self {
        self.register(handler);
        self
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Delivers `events` to every interested handler.
    ///
    /// Stops at the first handler failure; events after the failing one are
    /// not delivered to any handler.
    ///
    /// # Errors
    ///
    /// Returns the failing handler's error unchanged.
    pub fn dispatch(&self, events: &[E]) -> Result<(), DomainError> {
        for event in events {
            let event_type = event.event_type();
            for handler in &self.handlers {
                if !handler.event_types().contains(&event_type) {
                    continue;
                }
                if let Err(err) = handler.handle(event) {
                    error!(
                        projection = handler.name(),
                        aggregate_id = %event.aggregate_id(),
                        sequence_number = event.sequence_number(),
                        event_type,
                        error = %err,
                        "projection failed; read model diverged from event log"
                    );
                    return Err(err);
                }
            }
        }
        debug!(
            event_count = events.len(),
            handler_count = self.handlers.len(),
            "dispatched committed events"
        );
        Ok(())
    }
}

impl<E: DomainEvent> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handler_count", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use uuid::Uuid;

    use super::*;
    use crate::testing::{CLOSED, CounterEvent, OPENED, TALLIED, counter_event};

    /// Records `(handler, aggregate_id, sequence_number)` for every delivery.
    struct Recorder {
        name: &'static str,
        types: &'static [&'static str],
        log: Arc<Mutex<Vec<(&'static str, Uuid, i64)>>>,
        fail_on: Option<i64>,
    }

    impl ProjectionHandler<CounterEvent> for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn event_types(&self) -> &'static [&'static str] {
            self.types
        }

        fn handle(&self, event: &CounterEvent) -> Result<(), DomainError> {
            if self.fail_on == Some(event.sequence_number()) {
                return Err(DomainError::ProjectionInconsistency {
                    projection: self.name,
                    aggregate_id: event.aggregate_id(),
                    reason: "missing record".into(),
                });
            }
            self.log.lock().unwrap().push((
                self.name,
                event.aggregate_id(),
                event.sequence_number(),
            ));
            Ok(())
        }
    }

    fn recorder(
        name: &'static str,
        types: &'static [&'static str],
        log: &Arc<Mutex<Vec<(&'static str, Uuid, i64)>>>,
    ) -> Arc<Recorder> {
        Arc::new(Recorder {
            name,
            types,
            log: Arc::clone(log),
            fail_on: None,
        })
    }

    #[test]
    fn test_dispatch_delivers_events_in_commit_order_then_registration_order() {
        // Arrange
        let id = Uuid::new_v4();
        let log = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = EventDispatcher::<CounterEvent>::new()
            .with_handler(recorder("first", &[OPENED, TALLIED], &log))
            .with_handler(recorder("second", &[OPENED, TALLIED], &log));
        let events = vec![counter_event(id, 1, OPENED), counter_event(id, 2, TALLIED)];

        // Act
        dispatcher.dispatch(&events).unwrap();

        // Assert
        assert_eq!(
            *log.lock().unwrap(),
            vec![("first", id, 1), ("second", id, 1), ("first", id, 2), ("second", id, 2)]
        );
    }

    #[test]
    fn test_dispatch_skips_handlers_not_registered_for_event_type() {
        // Arrange
        let id = Uuid::new_v4();
        let log = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = EventDispatcher::<CounterEvent>::new()
            .with_handler(recorder("lifecycle", &[OPENED, CLOSED], &log))
            .with_handler(recorder("tally", &[TALLIED], &log));
        let events = vec![
            counter_event(id, 1, OPENED),
            counter_event(id, 2, TALLIED),
            counter_event(id, 3, CLOSED),
        ];

        // Act
        dispatcher.dispatch(&events).unwrap();

        // Assert
        assert_eq!(
            *log.lock().unwrap(),
            vec![("lifecycle", id, 1), ("tally", id, 2), ("lifecycle", id, 3)]
        );
    }

    #[test]
    fn test_dispatch_returns_handler_error_and_stops() {
        // Arrange
        let id = Uuid::new_v4();
        let log = Arc::new(Mutex::new(Vec::new()));
        let failing = Arc::new(Recorder {
            name: "failing",
            types: &[OPENED, TALLIED],
            log: Arc::clone(&log),
            fail_on: Some(2),
        });
        let dispatcher = EventDispatcher::<CounterEvent>::new()
            .with_handler(failing)
            .with_handler(recorder("after", &[OPENED, TALLIED], &log));
        let events = vec![
            counter_event(id, 1, OPENED),
            counter_event(id, 2, TALLIED),
            counter_event(id, 3, TALLIED),
        ];

        // Act
        let result = dispatcher.dispatch(&events);

        // Assert
        match result.unwrap_err() {
            DomainError::ProjectionInconsistency {
                projection,
                aggregate_id,
                ..
            } => {
                assert_eq!(projection, "failing");
                assert_eq!(aggregate_id, id);
            }
            other => panic!("expected ProjectionInconsistency, got {other:?}"),
        }
        assert_eq!(
            *log.lock().unwrap(),
            vec![("failing", id, 1), ("after", id, 1)]
        );
    }

    #[test]
    fn test_dispatch_with_no_handlers_is_ok() {
        let dispatcher: EventDispatcher<CounterEvent> = EventDispatcher::default();

        let result = dispatcher.dispatch(&[counter_event(Uuid::new_v4(), 1, OPENED)]);

        assert!(result.is_ok());
        assert_eq!(dispatcher.handler_count(), 0);
    }
}
