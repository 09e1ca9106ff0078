//! Query-side read model for inventory items.
//!
//! The store is written only by the projections in
//! [`crate::application::projections`]; consumers read it through
//! [`ReadModelFacade`].

mod facade;
mod store;

use serde::Serialize;
use uuid::Uuid;

pub use facade::{ReadModel, ReadModelFacade};
pub use store::InventoryReadModelStore;

/// Lightweight list entry for an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItemListDto {
    /// The item identifier.
    pub id: Uuid,
    /// Current display name.
    pub name: String,
}

/// Full detail record for an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItemDetailsDto {
    /// The item identifier.
    pub id: Uuid,
    /// Current display name.
    pub name: String,
    /// Units on hand.
    pub current_count: u32,
    /// Zero-based position of the last event applied to this record; the
    /// creation event is version 0.
    pub version: i64,
}
