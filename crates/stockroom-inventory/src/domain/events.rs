//! Domain events for the inventory context.

use serde::{Deserialize, Serialize};
use stockroom_core::error::DomainError;
use stockroom_core::event::{DomainEvent, EventMetadata};
use stockroom_core::event_log::StoredEvent;
use uuid::Uuid;

/// Event type tag for `InventoryItemCreated`.
pub const ITEM_CREATED_EVENT_TYPE: &str = "inventory.item_created";
/// Event type tag for `InventoryItemRenamed`.
pub const ITEM_RENAMED_EVENT_TYPE: &str = "inventory.item_renamed";
/// Event type tag for `ItemsCheckedIntoInventory`.
pub const ITEMS_CHECKED_IN_EVENT_TYPE: &str = "inventory.items_checked_in";
/// Event type tag for `ItemsRemovedFromInventory`.
pub const ITEMS_REMOVED_EVENT_TYPE: &str = "inventory.items_removed";
/// Event type tag for `InventoryItemDeactivated`.
pub const ITEM_DEACTIVATED_EVENT_TYPE: &str = "inventory.item_deactivated";

/// Emitted when an inventory item is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItemCreated {
    /// The item identifier.
    pub item_id: Uuid,
    /// Display name of the item.
    pub name: String,
}

/// Emitted when an inventory item is renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItemRenamed {
    /// The item identifier.
    pub item_id: Uuid,
    /// The new display name.
    pub new_name: String,
}

/// Emitted when stock is checked into the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsCheckedIntoInventory {
    /// The item identifier.
    pub item_id: Uuid,
    /// Number of units checked in.
    pub count: u32,
}

/// Emitted when stock is removed from the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsRemovedFromInventory {
    /// The item identifier.
    pub item_id: Uuid,
    /// Number of units removed.
    pub count: u32,
}

/// Emitted when an inventory item is deactivated. Terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItemDeactivated {
    /// The item identifier.
    pub item_id: Uuid,
}

/// Event payload variants for the inventory context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryItemEventKind {
    /// An item has been created.
    InventoryItemCreated(InventoryItemCreated),
    /// An item has been renamed.
    InventoryItemRenamed(InventoryItemRenamed),
    /// Stock has been checked in.
    ItemsCheckedIntoInventory(ItemsCheckedIntoInventory),
    /// Stock has been removed.
    ItemsRemovedFromInventory(ItemsRemovedFromInventory),
    /// An item has been deactivated.
    InventoryItemDeactivated(InventoryItemDeactivated),
}

/// Domain event envelope for the inventory context.
#[derive(Debug, Clone)]
pub struct InventoryItemEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: InventoryItemEventKind,
}

impl DomainEvent for InventoryItemEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            InventoryItemEventKind::InventoryItemCreated(_) => ITEM_CREATED_EVENT_TYPE,
            InventoryItemEventKind::InventoryItemRenamed(_) => ITEM_RENAMED_EVENT_TYPE,
            InventoryItemEventKind::ItemsCheckedIntoInventory(_) => ITEMS_CHECKED_IN_EVENT_TYPE,
            InventoryItemEventKind::ItemsRemovedFromInventory(_) => ITEMS_REMOVED_EVENT_TYPE,
            InventoryItemEventKind::InventoryItemDeactivated(_) => ITEM_DEACTIVATED_EVENT_TYPE,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind)
            .expect("InventoryItemEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn from_stored(stored: &StoredEvent) -> Result<Self, DomainError> {
        let kind: InventoryItemEventKind = serde_json::from_value(stored.payload.clone())
            .map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        Ok(Self {
            metadata: EventMetadata::from_stored(stored),
            kind,
        })
    }
}
