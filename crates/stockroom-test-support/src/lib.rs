//! Shared test mocks and utilities for Stockroom.

mod clock;
mod event_log;
mod projection;

pub use clock::FixedClock;
pub use event_log::{
    ConflictingEventLog, DelayedAckEventLog, EmptyEventLog, FailingEventLog, RecordingEventLog,
};
pub use projection::RecordingProjection;
