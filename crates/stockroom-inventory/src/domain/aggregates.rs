//! Aggregate roots for the inventory context.

use stockroom_core::aggregate::AggregateRoot;
use stockroom_core::clock::Clock;
use stockroom_core::error::DomainError;
use stockroom_core::event::{DomainEvent, EventMetadata};
use uuid::Uuid;

use super::events::{
    InventoryItemCreated, InventoryItemDeactivated, InventoryItemEvent, InventoryItemEventKind,
    InventoryItemRenamed, ItemsCheckedIntoInventory, ItemsRemovedFromInventory,
};

/// The aggregate root for a stocked inventory item.
///
/// Domain methods fold the event they raise into state immediately, so a
/// later call in the same command sees its effect; `version` only moves
/// once the events are committed.
#[derive(Debug)]
pub struct InventoryItem {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Persisted version (committed event count).
    pub(crate) version: i64,
    name: String,
    activated: bool,
    current_count: u32,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<InventoryItemEvent>,
}

impl InventoryItem {
    /// Current display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the item is created and not yet deactivated.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.activated
    }

    /// Units currently on hand.
    #[must_use]
    pub fn current_count(&self) -> u32 {
        self.current_count
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn record(&mut self, kind: InventoryItemEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let mut event = InventoryItemEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: String::new(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                causation_id: correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        event.metadata.event_type = event.event_type().to_owned();
        self.when(&event.kind);
        self.uncommitted_events.push(event);
    }

    fn when(&mut self, kind: &InventoryItemEventKind) {
        match kind {
            InventoryItemEventKind::InventoryItemCreated(payload) => {
                self.name.clone_from(&payload.name);
                self.activated = true;
            }
            InventoryItemEventKind::InventoryItemRenamed(payload) => {
                self.name.clone_from(&payload.new_name);
            }
            InventoryItemEventKind::ItemsCheckedIntoInventory(payload) => {
                self.current_count = self.current_count.saturating_add(payload.count);
            }
            InventoryItemEventKind::ItemsRemovedFromInventory(payload) => {
                self.current_count = self.current_count.saturating_sub(payload.count);
            }
            InventoryItemEventKind::InventoryItemDeactivated(_) => {
                self.activated = false;
            }
        }
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.activated {
            Ok(())
        } else {
            Err(DomainError::Validation(format!(
                "inventory item {} is not active",
                self.id
            )))
        }
    }

    fn ensure_positive(count: u32) -> Result<(), DomainError> {
        if count == 0 {
            return Err(DomainError::Validation(
                "count must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    fn ensure_name(name: &str) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::Validation(
                "inventory item name must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Creates the item, producing an `InventoryItemCreated` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name is blank or the item
    /// already has history.
    pub fn create(
        &mut self,
        name: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        Self::ensure_name(name)?;
        if self.version > 0 || !self.uncommitted_events.is_empty() {
            return Err(DomainError::Validation(format!(
                "inventory item {} already exists",
                self.id
            )));
        }
        self.record(
            InventoryItemEventKind::InventoryItemCreated(InventoryItemCreated {
                item_id: self.id,
                name: name.to_owned(),
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Renames the item, producing an `InventoryItemRenamed` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name is blank or the item is
    /// not active.
    pub fn rename(
        &mut self,
        new_name: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        Self::ensure_name(new_name)?;
        self.ensure_active()?;
        self.record(
            InventoryItemEventKind::InventoryItemRenamed(InventoryItemRenamed {
                item_id: self.id,
                new_name: new_name.to_owned(),
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Checks stock in, producing an `ItemsCheckedIntoInventory` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `count` is zero, would overflow
    /// the on-hand count, or the item is not active.
    pub fn check_in(
        &mut self,
        count: u32,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        Self::ensure_positive(count)?;
        self.ensure_active()?;
        if self.current_count.checked_add(count).is_none() {
            return Err(DomainError::Validation(format!(
                "checking in {count} units would overflow inventory item {}",
                self.id
            )));
        }
        self.record(
            InventoryItemEventKind::ItemsCheckedIntoInventory(ItemsCheckedIntoInventory {
                item_id: self.id,
                count,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Removes stock, producing an `ItemsRemovedFromInventory` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `count` is zero, exceeds the units
    /// on hand, or the item is not active.
    pub fn remove(
        &mut self,
        count: u32,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        Self::ensure_positive(count)?;
        self.ensure_active()?;
        if count > self.current_count {
            return Err(DomainError::Validation(format!(
                "cannot remove {count} units from inventory item {}: only {} on hand",
                self.id, self.current_count
            )));
        }
        self.record(
            InventoryItemEventKind::ItemsRemovedFromInventory(ItemsRemovedFromInventory {
                item_id: self.id,
                count,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Deactivates the item, producing an `InventoryItemDeactivated` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the item is already inactive.
    pub fn deactivate(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        if !self.activated {
            return Err(DomainError::Validation(format!(
                "inventory item {} is already deactivated",
                self.id
            )));
        }
        self.record(
            InventoryItemEventKind::InventoryItemDeactivated(InventoryItemDeactivated {
                item_id: self.id,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }
}

impl AggregateRoot for InventoryItem {
    type Event = InventoryItemEvent;

    const AGGREGATE_TYPE: &'static str = "inventory_item";

    fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            name: String::new(),
            activated: false,
            current_count: 0,
            uncommitted_events: Vec::new(),
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        self.when(&event.kind);
        self.version = event.metadata.sequence_number;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    #[allow(clippy::cast_possible_wrap)]
    fn mark_events_committed(&mut self) {
        self.version += self.uncommitted_events.len() as i64;
        self.uncommitted_events.clear();
    }
}
