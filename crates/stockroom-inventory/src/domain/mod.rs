//! Domain layer for the inventory context.

pub mod aggregates;
pub mod commands;
pub mod events;
