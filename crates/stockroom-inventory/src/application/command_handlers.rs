//! Command handlers for the inventory context.
//!
//! Each handler loads the item through the repository, runs the domain
//! method, and saves. The save appends the new events and drives the
//! projections before the handler returns.

use stockroom_core::aggregate::AggregateRoot;
use stockroom_core::clock::Clock;
use stockroom_core::command::Command;
use stockroom_core::error::DomainError;
use stockroom_core::event_log::StoredEvent;
use stockroom_core::repository::AggregateRepository;
use tracing::info;
use uuid::Uuid;

use crate::domain::aggregates::InventoryItem;
use crate::domain::commands::{
    CheckInItemsToInventory, CreateInventoryItem, DeactivateInventoryItem,
    RemoveItemsFromInventory, RenameInventoryItem,
};

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct InventoryCommandResult {
    /// The aggregate ID affected by the command.
    pub aggregate_id: Uuid,
    /// The stored events produced and persisted.
    pub stored_events: Vec<StoredEvent>,
}

async fn load_existing(
    repo: &AggregateRepository<InventoryItem>,
    item_id: Uuid,
) -> Result<InventoryItem, DomainError> {
    repo.load(item_id)
        .await?
        .ok_or(DomainError::AggregateNotFound(item_id))
}

/// Stream version a save expects. `original_version` is the `version` the
/// caller read from the detail view, which counts from zero, so the stream
/// holds one more event than it names.
fn expected_version(item: &InventoryItem, original_version: Option<i64>) -> i64 {
    original_version.map_or(item.version(), |observed| observed.saturating_add(1))
}

async fn save(
    command: &dyn Command,
    repo: &AggregateRepository<InventoryItem>,
    mut item: InventoryItem,
    expected_version: i64,
) -> Result<InventoryCommandResult, DomainError> {
    let stored_events = repo.save(&mut item, expected_version).await?;
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        aggregate_id = %item.id,
        version = item.version(),
        "command handled"
    );
    Ok(InventoryCommandResult {
        aggregate_id: item.id,
        stored_events,
    })
}

/// Handles `CreateInventoryItem`: starts a new stream for the item.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank name,
/// `DomainError::ConcurrencyConflict` if the id already has a stream, and
/// any log or projection error raised by the save.
pub async fn handle_create_inventory_item(
    command: &CreateInventoryItem,
    clock: &dyn Clock,
    repo: &AggregateRepository<InventoryItem>,
) -> Result<InventoryCommandResult, DomainError> {
    let mut item = InventoryItem::new(command.item_id);
    item.create(&command.name, command.correlation_id, clock)?;
    save(command, repo, item, 0).await
}

/// Handles `RenameInventoryItem`.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown item,
/// `DomainError::Validation` if the rename is refused, and any log or
/// projection error raised by the save.
pub async fn handle_rename_inventory_item(
    command: &RenameInventoryItem,
    clock: &dyn Clock,
    repo: &AggregateRepository<InventoryItem>,
) -> Result<InventoryCommandResult, DomainError> {
    let mut item = load_existing(repo, command.item_id).await?;
    item.rename(&command.new_name, command.correlation_id, clock)?;
    let expected = expected_version(&item, command.original_version);
    save(command, repo, item, expected).await
}

/// Handles `CheckInItemsToInventory`.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown item,
/// `DomainError::Validation` if the check-in is refused, and any log or
/// projection error raised by the save.
pub async fn handle_check_in_items(
    command: &CheckInItemsToInventory,
    clock: &dyn Clock,
    repo: &AggregateRepository<InventoryItem>,
) -> Result<InventoryCommandResult, DomainError> {
    let mut item = load_existing(repo, command.item_id).await?;
    item.check_in(command.count, command.correlation_id, clock)?;
    let expected = expected_version(&item, command.original_version);
    save(command, repo, item, expected).await
}

/// Handles `RemoveItemsFromInventory`.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown item,
/// `DomainError::Validation` if the removal is refused, and any log or
/// projection error raised by the save.
pub async fn handle_remove_items(
    command: &RemoveItemsFromInventory,
    clock: &dyn Clock,
    repo: &AggregateRepository<InventoryItem>,
) -> Result<InventoryCommandResult, DomainError> {
    let mut item = load_existing(repo, command.item_id).await?;
    item.remove(command.count, command.correlation_id, clock)?;
    let expected = expected_version(&item, command.original_version);
    save(command, repo, item, expected).await
}

/// Handles `DeactivateInventoryItem`.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown item,
/// `DomainError::Validation` if it is already inactive, and any log or
/// projection error raised by the save.
pub async fn handle_deactivate_inventory_item(
    command: &DeactivateInventoryItem,
    clock: &dyn Clock,
    repo: &AggregateRepository<InventoryItem>,
) -> Result<InventoryCommandResult, DomainError> {
    let mut item = load_existing(repo, command.item_id).await?;
    item.deactivate(command.correlation_id, clock)?;
    let expected = expected_version(&item, command.original_version);
    save(command, repo, item, expected).await
}
