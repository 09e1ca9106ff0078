//! Projections that keep the inventory read model in step with committed
//! events.
//!
//! Both views are driven synchronously by the repository's dispatcher, in
//! commit order. A projection that cannot find the record an event refers to
//! reports `ProjectionInconsistency` rather than guessing.

use std::sync::Arc;

use stockroom_core::error::DomainError;
use stockroom_core::event::DomainEvent;
use stockroom_core::projection::{EventDispatcher, ProjectionHandler};
use tracing::debug;
use uuid::Uuid;

use crate::domain::events::{
    ITEM_CREATED_EVENT_TYPE, ITEM_DEACTIVATED_EVENT_TYPE, ITEM_RENAMED_EVENT_TYPE,
    ITEMS_CHECKED_IN_EVENT_TYPE, ITEMS_REMOVED_EVENT_TYPE, InventoryItemEvent,
    InventoryItemEventKind,
};
use crate::read_model::{InventoryItemDetailsDto, InventoryItemListDto, InventoryReadModelStore};

/// Builds the dispatcher for inventory events: list view first, then detail
/// view, both writing into `store`.
#[must_use]
pub fn inventory_dispatcher(
    store: &Arc<InventoryReadModelStore>,
) -> EventDispatcher<InventoryItemEvent> {
    EventDispatcher::<InventoryItemEvent>::new()
        .with_handler(Arc::new(InventoryListView::new(Arc::clone(store))))
        .with_handler(Arc::new(InventoryItemDetailView::new(Arc::clone(store))))
}

fn inconsistency(projection: &'static str, aggregate_id: Uuid, reason: String) -> DomainError {
    DomainError::ProjectionInconsistency {
        projection,
        aggregate_id,
        reason,
    }
}

/// Maintains the ordered list of active items.
#[derive(Debug)]
pub struct InventoryListView {
    store: Arc<InventoryReadModelStore>,
}

impl InventoryListView {
    const NAME: &'static str = "inventory_list_view";

    /// Creates the view over `store`.
    #[must_use]
    pub fn new(store: Arc<InventoryReadModelStore>) -> Self {
        Self { store }
    }
}

impl ProjectionHandler<InventoryItemEvent> for InventoryListView {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn event_types(&self) -> &'static [&'static str] {
        &[
            ITEM_CREATED_EVENT_TYPE,
            ITEM_RENAMED_EVENT_TYPE,
            ITEM_DEACTIVATED_EVENT_TYPE,
        ]
    }

    fn handle(&self, event: &InventoryItemEvent) -> Result<(), DomainError> {
        let id = event.aggregate_id();
        match &event.kind {
            InventoryItemEventKind::InventoryItemCreated(payload) => {
                let entry = InventoryItemListDto {
                    id,
                    name: payload.name.clone(),
                };
                if !self.store.insert_list_entry(entry) {
                    return Err(inconsistency(
                        Self::NAME,
                        id,
                        "list entry already exists for created item".into(),
                    ));
                }
            }
            InventoryItemEventKind::InventoryItemRenamed(payload) => {
                if !self
                    .store
                    .update_list_entry(id, |entry| entry.name.clone_from(&payload.new_name))
                {
                    return Err(inconsistency(
                        Self::NAME,
                        id,
                        "no list entry to rename".into(),
                    ));
                }
            }
            InventoryItemEventKind::InventoryItemDeactivated(_) => {
                if self.store.remove_list_entry(id).is_none() {
                    return Err(inconsistency(
                        Self::NAME,
                        id,
                        "no list entry to remove".into(),
                    ));
                }
            }
            InventoryItemEventKind::ItemsCheckedIntoInventory(_)
            | InventoryItemEventKind::ItemsRemovedFromInventory(_) => {}
        }
        debug!(
            projection = Self::NAME,
            aggregate_id = %id,
            event_type = event.event_type(),
            "list view updated"
        );
        Ok(())
    }
}

/// Maintains one detail record per active item.
#[derive(Debug)]
pub struct InventoryItemDetailView {
    store: Arc<InventoryReadModelStore>,
}

impl InventoryItemDetailView {
    const NAME: &'static str = "inventory_item_detail_view";

    /// Creates the view over `store`.
    #[must_use]
    pub fn new(store: Arc<InventoryReadModelStore>) -> Self {
        Self { store }
    }

    /// Applies `change` to the record for `event`, stamping the event's
    /// zero-based version on success.
    fn update(
        &self,
        event: &InventoryItemEvent,
        change: impl FnOnce(&mut InventoryItemDetailsDto) -> Result<(), String>,
    ) -> Result<(), DomainError> {
        let id = event.aggregate_id();
        let version = event.sequence_number() - 1;
        let mut outcome = Ok(());
        let found = self.store.update_details(id, |record| {
            outcome = change(record);
            if outcome.is_ok() {
                record.version = version;
            }
        });
        if !found {
            return Err(inconsistency(
                Self::NAME,
                id,
                format!("no detail record for {}", event.event_type()),
            ));
        }
        outcome.map_err(|reason| inconsistency(Self::NAME, id, reason))
    }
}

impl ProjectionHandler<InventoryItemEvent> for InventoryItemDetailView {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn event_types(&self) -> &'static [&'static str] {
        &[
            ITEM_CREATED_EVENT_TYPE,
            ITEM_RENAMED_EVENT_TYPE,
            ITEMS_CHECKED_IN_EVENT_TYPE,
            ITEMS_REMOVED_EVENT_TYPE,
            ITEM_DEACTIVATED_EVENT_TYPE,
        ]
    }

    fn handle(&self, event: &InventoryItemEvent) -> Result<(), DomainError> {
        let id = event.aggregate_id();
        match &event.kind {
            InventoryItemEventKind::InventoryItemCreated(payload) => {
                let record = InventoryItemDetailsDto {
                    id,
                    name: payload.name.clone(),
                    current_count: 0,
                    version: event.sequence_number() - 1,
                };
                if !self.store.insert_details(record) {
                    return Err(inconsistency(
                        Self::NAME,
                        id,
                        "detail record already exists for created item".into(),
                    ));
                }
            }
            InventoryItemEventKind::InventoryItemRenamed(payload) => {
                self.update(event, |record| {
                    record.name.clone_from(&payload.new_name);
                    Ok(())
                })?;
            }
            InventoryItemEventKind::ItemsCheckedIntoInventory(payload) => {
                self.update(event, |record| {
                    record.current_count = record
                        .current_count
                        .checked_add(payload.count)
                        .ok_or_else(|| format!("checking in {} overflows count", payload.count))?;
                    Ok(())
                })?;
            }
            InventoryItemEventKind::ItemsRemovedFromInventory(payload) => {
                self.update(event, |record| {
                    record.current_count = record
                        .current_count
                        .checked_sub(payload.count)
                        .ok_or_else(|| {
                            format!(
                                "removing {} exceeds recorded count {}",
                                payload.count, record.current_count
                            )
                        })?;
                    Ok(())
                })?;
            }
            InventoryItemEventKind::InventoryItemDeactivated(_) => {
                if self.store.remove_details(id).is_none() {
                    return Err(inconsistency(
                        Self::NAME,
                        id,
                        "no detail record to remove".into(),
                    ));
                }
            }
        }
        debug!(
            projection = Self::NAME,
            aggregate_id = %id,
            event_type = event.event_type(),
            "detail view updated"
        );
        Ok(())
    }
}
