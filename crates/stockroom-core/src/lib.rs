//! Stockroom Core: event-sourcing and projection abstractions.
//!
//! This crate defines the aggregate, event and event log contracts, the
//! generic aggregate repository and the synchronous projection dispatcher.
//! It contains no storage implementations.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod event_log;
pub mod projection;
pub mod repository;

#[cfg(test)]
mod testing;
