//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
///
/// Loading an aggregate with no stream is not an error: the repository
/// returns `Ok(None)`. `AggregateNotFound` is raised by command and query
/// handlers that require the aggregate to exist.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An aggregate was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// The event log or its backing storage failed.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),

    /// A stream was written by a different aggregate type than the one
    /// requested.
    #[error("aggregate {aggregate_id} has type {found}, expected {expected}")]
    AggregateTypeMismatch {
        /// The aggregate whose stream was read.
        aggregate_id: Uuid,
        /// The aggregate type requested by the caller.
        expected: &'static str,
        /// The aggregate type recorded on the stored event.
        found: String,
    },

    /// A projection could not apply a committed event, so the read model no
    /// longer matches the event log.
    #[error("projection {projection} is inconsistent for aggregate {aggregate_id}: {reason}")]
    ProjectionInconsistency {
        /// Name of the projection that failed.
        projection: &'static str,
        /// The aggregate the event belonged to.
        aggregate_id: Uuid,
        /// What the projection expected to find.
        reason: String,
    },
}

impl DomainError {
    /// Returns `true` for optimistic concurrency conflicts, which callers may
    /// retry by reloading the aggregate.
    #[must_use]
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }
}
