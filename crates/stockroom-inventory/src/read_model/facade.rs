//! Read-only facade over the inventory read model.

use std::sync::Arc;

use uuid::Uuid;

use super::{InventoryItemDetailsDto, InventoryItemListDto, InventoryReadModelStore};

/// Query interface exposed to read-side consumers.
pub trait ReadModelFacade: Send + Sync {
    /// All active inventory items, in the order they were first created.
    fn inventory_items(&self) -> Vec<InventoryItemListDto>;

    /// Detail record for one item, or `None` if unknown or deactivated.
    fn inventory_item_details(&self, id: Uuid) -> Option<InventoryItemDetailsDto>;
}

/// [`ReadModelFacade`] backed by a shared [`InventoryReadModelStore`].
#[derive(Debug, Clone)]
pub struct ReadModel {
    store: Arc<InventoryReadModelStore>,
}

impl ReadModel {
    /// Creates a facade over `store`.
    #[must_use]
    pub fn new(store: Arc<InventoryReadModelStore>) -> Self {
        Self { store }
    }
}

impl ReadModelFacade for ReadModel {
    fn inventory_items(&self) -> Vec<InventoryItemListDto> {
        self.store.list()
    }

    fn inventory_item_details(&self, id: Uuid) -> Option<InventoryItemDetailsDto> {
        self.store.details(id)
    }
}
