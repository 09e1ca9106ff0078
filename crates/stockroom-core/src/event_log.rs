//! Append-only event log contract.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::event::DomainEvent;

/// Stored representation of a domain event.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Aggregate this event belongs to.
    pub aggregate_id: Uuid,
    /// Type of the aggregate that owns the stream.
    pub aggregate_type: String,
    /// Event type name for deserialization routing.
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// 1-based sequence number within the aggregate stream.
    pub sequence_number: i64,
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Causation ID linking to the causing event/command.
    pub causation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}

impl StoredEvent {
    /// Converts a typed domain event into its stored form.
    pub fn from_event<E: DomainEvent>(event: &E, aggregate_type: &str) -> Self {
        let meta = event.metadata();
        Self {
            event_id: meta.event_id,
            aggregate_id: meta.aggregate_id,
            aggregate_type: aggregate_type.to_owned(),
            event_type: event.event_type().to_owned(),
            payload: event.to_payload(),
            sequence_number: meta.sequence_number,
            correlation_id: meta.correlation_id,
            causation_id: meta.causation_id,
            occurred_at: meta.occurred_at,
        }
    }
}

/// Append-only storage of per-aggregate event streams.
///
/// A stream's version is the number of events it holds; a stream that has
/// never been written has version 0.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Reads all events of a stream ordered by sequence number. Returns an
    /// empty vec for a stream that has never been written.
    async fn read_stream(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError>;

    /// Appends events to a stream if, and only if, its current version equals
    /// `expected_version`. Either every event is appended or none is.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ConcurrencyConflict` on a version mismatch and
    /// `DomainError::Infrastructure` when the backing storage fails.
    async fn append_to_stream(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError>;

    /// Reads every event in the log in global commit order.
    async fn read_all(&self) -> Result<Vec<StoredEvent>, DomainError>;
}
