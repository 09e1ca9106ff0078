//! Query handlers for the inventory context.
//!
//! Queries never touch the event log; they answer from the read model kept
//! current by the projections.

use stockroom_core::error::DomainError;
use uuid::Uuid;

use crate::read_model::{InventoryItemDetailsDto, InventoryItemListDto, ReadModelFacade};

/// Lists every active inventory item in creation order.
#[must_use]
pub fn get_inventory_items(read_model: &dyn ReadModelFacade) -> Vec<InventoryItemListDto> {
    read_model.inventory_items()
}

/// Retrieves the detail record of one inventory item.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the item is unknown or has
/// been deactivated.
pub fn get_inventory_item_details(
    item_id: Uuid,
    read_model: &dyn ReadModelFacade,
) -> Result<InventoryItemDetailsDto, DomainError> {
    read_model
        .inventory_item_details(item_id)
        .ok_or(DomainError::AggregateNotFound(item_id))
}
