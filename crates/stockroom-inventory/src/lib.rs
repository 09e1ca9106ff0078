//! Stockroom inventory bounded context.
//!
//! Inventory items are event-sourced through the core repository; two
//! projections keep an in-memory read model (a list view and a detail view)
//! in step with every committed event.

pub mod application;
pub mod domain;
pub mod read_model;
