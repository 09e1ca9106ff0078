//! Application layer: command handlers, projections and queries.

pub mod command_handlers;
pub mod projections;
pub mod query_handlers;
