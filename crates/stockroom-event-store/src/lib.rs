//! Stockroom event store: `EventLog` implementations.
//!
//! `InMemoryEventLog` backs tests and local runs without a database;
//! `PgEventLog` persists streams to PostgreSQL.

pub mod in_memory_event_log;
pub mod pg_event_log;
pub mod schema;
