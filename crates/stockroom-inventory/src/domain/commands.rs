//! Commands for the inventory context.
//!
//! Mutating commands carry the version the caller last observed. When set it
//! becomes the expected version of the save; when `None` the version the
//! aggregate was loaded at is used.

use stockroom_core::command::Command;
use uuid::Uuid;

/// Command to create an inventory item.
#[derive(Debug, Clone)]
pub struct CreateInventoryItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The item identifier.
    pub item_id: Uuid,
    /// Display name of the new item.
    pub name: String,
}

/// Command to rename an inventory item.
#[derive(Debug, Clone)]
pub struct RenameInventoryItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The item identifier.
    pub item_id: Uuid,
    /// The new display name.
    pub new_name: String,
    /// Version the caller last observed.
    pub original_version: Option<i64>,
}

/// Command to check stock into an inventory item.
#[derive(Debug, Clone)]
pub struct CheckInItemsToInventory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The item identifier.
    pub item_id: Uuid,
    /// Number of units to check in.
    pub count: u32,
    /// Version the caller last observed.
    pub original_version: Option<i64>,
}

/// Command to remove stock from an inventory item.
#[derive(Debug, Clone)]
pub struct RemoveItemsFromInventory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The item identifier.
    pub item_id: Uuid,
    /// Number of units to remove.
    pub count: u32,
    /// Version the caller last observed.
    pub original_version: Option<i64>,
}

/// Command to deactivate an inventory item.
#[derive(Debug, Clone)]
pub struct DeactivateInventoryItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The item identifier.
    pub item_id: Uuid,
    /// Version the caller last observed.
    pub original_version: Option<i64>,
}

macro_rules! impl_command {
    ($($command:ty => $name:literal),* $(,)?) => {
        $(
            impl Command for $command {
                fn command_type(&self) -> &'static str {
                    $name
                }

                fn correlation_id(&self) -> Uuid {
                    self.correlation_id
                }

                fn aggregate_id(&self) -> Uuid {
                    self.item_id
                }
            }
        )*
    };
}

impl_command! {
    CreateInventoryItem => "inventory.create_item",
    RenameInventoryItem => "inventory.rename_item",
    CheckInItemsToInventory => "inventory.check_in_items",
    RemoveItemsFromInventory => "inventory.remove_items",
    DeactivateInventoryItem => "inventory.deactivate_item",
}
