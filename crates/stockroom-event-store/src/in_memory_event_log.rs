//! In-memory implementation of the `EventLog` trait.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use stockroom_core::error::DomainError;
use stockroom_core::event_log::{EventLog, StoredEvent};

/// Event log that keeps every stream in process memory.
///
/// A single lock guards both the per-stream index and the global commit
/// order, so an append is visible to readers either completely or not at all.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    streams: HashMap<Uuid, Vec<StoredEvent>>,
    committed: Vec<StoredEvent>,
}

impl InMemoryEventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> DomainError {
    DomainError::Infrastructure("in-memory event log lock poisoned".into())
}

/// Checks that `events` belong to `aggregate_id` and continue the stream
/// from `current_version` without gaps.
fn validate_batch(
    aggregate_id: Uuid,
    current_version: i64,
    events: &[StoredEvent],
) -> Result<(), DomainError> {
    for (expected_sequence, event) in (current_version + 1..).zip(events) {
        if event.aggregate_id != aggregate_id {
            return Err(DomainError::Infrastructure(format!(
                "event {} belongs to aggregate {}, not {aggregate_id}",
                event.event_id, event.aggregate_id
            )));
        }
        if event.sequence_number != expected_sequence {
            return Err(DomainError::Infrastructure(format!(
                "event {} has sequence number {}, expected {expected_sequence}",
                event.event_id, event.sequence_number
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn read_stream(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.streams.get(&aggregate_id).cloned().unwrap_or_default())
    }

    async fn append_to_stream(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let actual = inner
            .streams
            .get(&aggregate_id)
            .map_or(0, |stream| i64::try_from(stream.len()).unwrap_or(i64::MAX));
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }
        validate_batch(aggregate_id, actual, events)?;

        inner
            .streams
            .entry(aggregate_id)
            .or_default()
            .extend_from_slice(events);
        inner.committed.extend_from_slice(events);
        drop(inner);

        debug!(%aggregate_id, appended = events.len(), "events appended to stream");
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<StoredEvent>, DomainError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.committed.clone())
    }
}
