//! Mock `EventLog` implementations for tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use stockroom_core::error::DomainError;
use stockroom_core::event_log::{EventLog, StoredEvent};
use uuid::Uuid;

/// An event log that serves a fixed stream and records every append.
///
/// `read_stream` and `read_all` both return the seeded events regardless of
/// the id asked for; appends always succeed and are not read back.
#[derive(Debug, Default)]
pub struct RecordingEventLog {
    stream: Vec<StoredEvent>,
    appended: Mutex<Vec<(Uuid, i64, Vec<StoredEvent>)>>,
}

impl RecordingEventLog {
    /// Create a log that serves `stream` from every read.
    #[must_use]
    pub fn new(stream: Vec<StoredEvent>) -> Self {
        Self {
            stream,
            appended: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of every `(aggregate_id, expected_version, events)`
    /// append received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<(Uuid, i64, Vec<StoredEvent>)> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventLog for RecordingEventLog {
    async fn read_stream(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.stream.clone())
    }

    async fn append_to_stream(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        self.appended
            .lock()
            .unwrap()
            .push((aggregate_id, expected_version, events.to_vec()));
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.stream.clone())
    }
}

/// An event log with no streams that silently accepts appends. Useful for
/// "aggregate not found" scenarios and creation commands.
#[derive(Debug)]
pub struct EmptyEventLog;

#[async_trait]
impl EventLog for EmptyEventLog {
    async fn read_stream(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(vec![])
    }

    async fn append_to_stream(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(vec![])
    }
}

/// An event log whose every operation fails with an infrastructure error.
#[derive(Debug)]
pub struct FailingEventLog;

#[async_trait]
impl EventLog for FailingEventLog {
    async fn read_stream(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append_to_stream(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn read_all(&self) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

/// An event log that serves a fixed stream but rejects every append as if
/// another writer had committed first.
#[derive(Debug)]
pub struct ConflictingEventLog {
    stream: Vec<StoredEvent>,
}

impl ConflictingEventLog {
    /// Create a log that serves `stream` and reports its version as one
    /// past its length on conflict.
    #[must_use]
    pub fn new(stream: Vec<StoredEvent>) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl EventLog for ConflictingEventLog {
    async fn read_stream(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.stream.clone())
    }

    #[allow(clippy::cast_possible_wrap)]
    async fn append_to_stream(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::ConcurrencyConflict {
            aggregate_id,
            expected: expected_version,
            actual: self.stream.len() as i64 + 1,
        })
    }

    async fn read_all(&self) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.stream.clone())
    }
}

/// Wraps another log and holds back the acknowledgement of the first
/// successful append for `delay`. The events are already committed in the
/// inner log while the caller waits, like a database commit whose reply is
/// still on the wire.
pub struct DelayedAckEventLog {
    inner: Arc<dyn EventLog>,
    delay: Duration,
    delayed: AtomicBool,
}

impl DelayedAckEventLog {
    /// Create a wrapper around `inner` that delays its first acknowledgement.
    #[must_use]
    pub fn new(inner: Arc<dyn EventLog>, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            delayed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EventLog for DelayedAckEventLog {
    async fn read_stream(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        self.inner.read_stream(aggregate_id).await
    }

    async fn append_to_stream(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        self.inner
            .append_to_stream(aggregate_id, expected_version, events)
            .await?;
        if !self.delayed.swap(true, Ordering::SeqCst) {
            tokio::time::sleep(self.delay).await;
        }
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<StoredEvent>, DomainError> {
        self.inner.read_all().await
    }
}
