//! Generic aggregate repository: load by replay, save with a version guard.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::aggregate::AggregateRoot;
use crate::error::DomainError;
use crate::event::DomainEvent;
use crate::event_log::{EventLog, StoredEvent};
use crate::projection::EventDispatcher;

/// Loads and saves aggregates of type `A` against an [`EventLog`], handing
/// every committed event to an [`EventDispatcher`].
///
/// Clones share one commit lock. It is held from the append until dispatch
/// finishes, so projections see saves in the order the log committed them.
pub struct AggregateRepository<A: AggregateRoot> {
    log: Arc<dyn EventLog>,
    dispatcher: Arc<EventDispatcher<A::Event>>,
    commit_lock: Arc<Mutex<()>>,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A: AggregateRoot> AggregateRepository<A> {
    /// Creates a repository that dispatches committed events to `dispatcher`.
    #[must_use]
    pub fn new(log: Arc<dyn EventLog>, dispatcher: Arc<EventDispatcher<A::Event>>) -> Self {
        Self {
            log,
            dispatcher,
            commit_lock: Arc::new(Mutex::new(())),
            _aggregate: PhantomData,
        }
    }

    /// Creates a repository with no projections registered.
    #[must_use]
    pub fn without_projections(log: Arc<dyn EventLog>) -> Self {
        Self::new(log, Arc::new(EventDispatcher::new()))
    }

    /// Loads an aggregate by replaying its stream.
    ///
    /// Returns `Ok(None)` when the stream has never been written.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AggregateTypeMismatch` if the stream belongs to
    /// another aggregate type, `DomainError::Infrastructure` if the log fails
    /// or an event does not decode.
    #[instrument(skip(self), fields(aggregate_type = A::AGGREGATE_TYPE))]
    pub async fn load(&self, aggregate_id: Uuid) -> Result<Option<A>, DomainError> {
        let stored_events = self.log.read_stream(aggregate_id).await?;
        if stored_events.is_empty() {
            debug!("no stream for aggregate");
            return Ok(None);
        }
        let aggregate = reconstitute::<A>(aggregate_id, &stored_events)?;
        debug!(
            version = aggregate.version(),
            replayed = stored_events.len(),
            "aggregate reconstituted"
        );
        Ok(Some(aggregate))
    }

    /// Appends the aggregate's uncommitted events, then dispatches them.
    ///
    /// A save with no uncommitted events does nothing. On a successful append
    /// the aggregate's buffer is cleared and its version raised before the
    /// events reach the projections. Returns the events as stored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ConcurrencyConflict` if `expected_version` does
    /// not match the aggregate or the stream, `DomainError::Infrastructure`
    /// if the log fails, and any projection error raised during dispatch.
    /// A projection error means the events are durable but the read model
    /// has diverged.
    #[instrument(
        skip(self, aggregate),
        fields(aggregate_type = A::AGGREGATE_TYPE, aggregate_id = %aggregate.aggregate_id())
    )]
    pub async fn save(
        &self,
        aggregate: &mut A,
        expected_version: i64,
    ) -> Result<Vec<StoredEvent>, DomainError> {
        if aggregate.uncommitted_events().is_empty() {
            return Ok(Vec::new());
        }

        let aggregate_id = aggregate.aggregate_id();
        if expected_version != aggregate.version() {
            warn!(
                expected_version,
                loaded_version = aggregate.version(),
                "expected version does not match loaded aggregate"
            );
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual: aggregate.version(),
            });
        }

        let committed: Vec<A::Event> = aggregate.uncommitted_events().to_vec();
        let stored_events: Vec<StoredEvent> = committed
            .iter()
            .map(|event| StoredEvent::from_event(event, A::AGGREGATE_TYPE))
            .collect();

        let _commit = self.commit_lock.lock().await;
        if let Err(err) = self
            .log
            .append_to_stream(aggregate_id, expected_version, &stored_events)
            .await
        {
            if err.is_concurrency_conflict() {
                warn!(expected_version, error = %err, "append rejected");
            }
            return Err(err);
        }

        aggregate.mark_events_committed();
        debug!(
            appended = stored_events.len(),
            version = aggregate.version(),
            "events committed"
        );

        self.dispatcher.dispatch(&committed)?;
        Ok(stored_events)
    }

    /// Replays every stored event of this aggregate type through the
    /// dispatcher, in global commit order. Returns the number of events
    /// replayed.
    ///
    /// Intended for warming freshly constructed read models at startup;
    /// replaying into a populated read model delivers events twice.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the log fails or an event
    /// does not decode, and any projection error raised during dispatch.
    #[instrument(skip(self), fields(aggregate_type = A::AGGREGATE_TYPE))]
    pub async fn replay_projections(&self) -> Result<usize, DomainError> {
        let _commit = self.commit_lock.lock().await;
        let events = self
            .log
            .read_all()
            .await?
            .iter()
            .filter(|stored| stored.aggregate_type == A::AGGREGATE_TYPE)
            .map(A::Event::from_stored)
            .collect::<Result<Vec<_>, _>>()?;
        self.dispatcher.dispatch(&events)?;
        debug!(replayed = events.len(), "projections rebuilt");
        Ok(events.len())
    }
}

impl<A: AggregateRoot> Clone for AggregateRepository<A> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            dispatcher: Arc::clone(&self.dispatcher),
            commit_lock: Arc::clone(&self.commit_lock),
            _aggregate: PhantomData,
        }
    }
}

impl<A: AggregateRoot> fmt::Debug for AggregateRepository<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateRepository")
            .field("aggregate_type", &A::AGGREGATE_TYPE)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// Folds stored events into a zero-value aggregate.
///
/// # Errors
///
/// Returns `DomainError::AggregateTypeMismatch` for events of another
/// aggregate type and `DomainError::Infrastructure` if decoding fails.
pub fn reconstitute<A: AggregateRoot>(
    aggregate_id: Uuid,
    stored_events: &[StoredEvent],
) -> Result<A, DomainError> {
    let mut aggregate = A::new(aggregate_id);
    for stored in stored_events {
        if stored.aggregate_type != A::AGGREGATE_TYPE {
            return Err(DomainError::AggregateTypeMismatch {
                aggregate_id,
                expected: A::AGGREGATE_TYPE,
                found: stored.aggregate_type.clone(),
            });
        }
        let event = A::Event::from_stored(stored)?;
        aggregate.apply(&event);
    }
    Ok(aggregate)
}
