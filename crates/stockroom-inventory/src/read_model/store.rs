//! In-memory storage for the inventory views.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

use super::{InventoryItemDetailsDto, InventoryItemListDto};

/// Holds the detail records by id and the list entries in first-seen order.
///
/// Both views sit behind one lock: readers share it, projection writes take
/// it exclusively, so a query never observes a record mid-update.
#[derive(Debug, Default)]
pub struct InventoryReadModelStore {
    views: RwLock<Views>,
}

#[derive(Debug, Default)]
struct Views {
    details: HashMap<Uuid, InventoryItemDetailsDto>,
    list: Vec<InventoryItemListDto>,
}

impl InventoryReadModelStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the detail record for `id`, if any.
    #[must_use]
    pub fn details(&self, id: Uuid) -> Option<InventoryItemDetailsDto> {
        self.views
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .details
            .get(&id)
            .cloned()
    }

    /// Returns all list entries in first-seen order.
    #[must_use]
    pub fn list(&self) -> Vec<InventoryItemListDto> {
        self.views
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .list
            .clone()
    }

    /// Inserts a detail record. Returns `false`, leaving the store
    /// untouched, if a record with the same id already exists.
    pub(crate) fn insert_details(&self, record: InventoryItemDetailsDto) -> bool {
        let mut views = self.views.write().unwrap_or_else(PoisonError::into_inner);
        if views.details.contains_key(&record.id) {
            return false;
        }
        views.details.insert(record.id, record);
        true
    }

    /// Mutates the detail record for `id` in place. Returns `false` if there
    /// is no such record.
    pub(crate) fn update_details(
        &self,
        id: Uuid,
        update: impl FnOnce(&mut InventoryItemDetailsDto),
    ) -> bool {
        let mut views = self.views.write().unwrap_or_else(PoisonError::into_inner);
        match views.details.get_mut(&id) {
            Some(record) => {
                update(record);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the detail record for `id`.
    pub(crate) fn remove_details(&self, id: Uuid) -> Option<InventoryItemDetailsDto> {
        self.views
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .details
            .remove(&id)
    }

    /// Appends a list entry. Returns `false`, leaving the store untouched, if
    /// an entry with the same id already exists.
    pub(crate) fn insert_list_entry(&self, entry: InventoryItemListDto) -> bool {
        let mut views = self.views.write().unwrap_or_else(PoisonError::into_inner);
        if views.list.iter().any(|existing| existing.id == entry.id) {
            return false;
        }
        views.list.push(entry);
        true
    }

    /// Mutates the list entry for `id` in place, keeping its position.
    /// Returns `false` if there is no such entry.
    pub(crate) fn update_list_entry(
        &self,
        id: Uuid,
        update: impl FnOnce(&mut InventoryItemListDto),
    ) -> bool {
        let mut views = self.views.write().unwrap_or_else(PoisonError::into_inner);
        match views.list.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                update(entry);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the list entry for `id`, preserving the order of
    /// the remaining entries.
    pub(crate) fn remove_list_entry(&self, id: Uuid) -> Option<InventoryItemListDto> {
        let mut views = self.views.write().unwrap_or_else(PoisonError::into_inner);
        let index = views.list.iter().position(|entry| entry.id == id)?;
        Some(views.list.remove(index))
    }
}
