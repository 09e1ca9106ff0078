//! Shared application state.

use std::sync::Arc;

use stockroom_core::clock::Clock;
use stockroom_core::event_log::EventLog;
use stockroom_core::repository::AggregateRepository;
use stockroom_inventory::application::projections::inventory_dispatcher;
use stockroom_inventory::domain::aggregates::InventoryItem;
use stockroom_inventory::read_model::{InventoryReadModelStore, ReadModel, ReadModelFacade};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Stamps `occurred_at` on new events.
    pub clock: Arc<dyn Clock>,
    /// Write side: loads and saves inventory items, driving the projections.
    pub repository: AggregateRepository<InventoryItem>,
    /// Read side: list and detail views.
    pub read_model: Arc<dyn ReadModelFacade>,
}

impl AppState {
    /// Wires a repository over `event_log` whose projections write into
    /// `store`, and a read-only facade over the same store.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        event_log: Arc<dyn EventLog>,
        store: Arc<InventoryReadModelStore>,
    ) -> Self {
        let dispatcher = Arc::new(inventory_dispatcher(&store));
        Self {
            clock,
            repository: AggregateRepository::new(event_log, dispatcher),
            read_model: Arc::new(ReadModel::new(store)),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}
