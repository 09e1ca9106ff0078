//! Routes for the inventory context.
//!
//! Commands are `POST`s that answer with the ids of the events they
//! committed; queries read the projected views.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use stockroom_inventory::application::command_handlers::{self, InventoryCommandResult};
use stockroom_inventory::application::query_handlers;
use stockroom_inventory::domain::commands;
use stockroom_inventory::read_model::{InventoryItemDetailsDto, InventoryItemListDto};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    /// Identifier for the new item; generated when omitted.
    pub id: Option<Uuid>,
    /// Display name.
    pub name: String,
}

/// Request body for POST /{id}/rename.
#[derive(Debug, Deserialize)]
pub struct RenameItemRequest {
    /// The new display name.
    pub new_name: String,
    /// Version the caller last observed.
    pub original_version: Option<i64>,
}

/// Request body for POST /{id}/check-in and POST /{id}/remove.
#[derive(Debug, Deserialize)]
pub struct StockMovementRequest {
    /// Number of units moved.
    pub count: u32,
    /// Version the caller last observed.
    pub original_version: Option<i64>,
}

/// Request body for POST /{id}/deactivate.
#[derive(Debug, Default, Deserialize)]
pub struct DeactivateItemRequest {
    /// Version the caller last observed.
    pub original_version: Option<i64>,
}

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// The item the command applied to.
    pub aggregate_id: Uuid,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
}

impl From<InventoryCommandResult> for CommandResponse {
    fn from(result: InventoryCommandResult) -> Self {
        Self {
            aggregate_id: result.aggregate_id,
            event_ids: result.stored_events.iter().map(|e| e.event_id).collect(),
        }
    }
}

/// POST /
#[instrument(skip(state, request))]
async fn create_item(
    State(state): State<AppState>,
    Json(request): Json<CreateItemRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::CreateInventoryItem {
        correlation_id: Uuid::new_v4(),
        item_id: request.id.unwrap_or_else(Uuid::new_v4),
        name: request.name,
    };
    let result = command_handlers::handle_create_inventory_item(
        &command,
        state.clock.as_ref(),
        &state.repository,
    )
    .await?;
    Ok(Json(result.into()))
}

/// POST /{id}/rename
#[instrument(skip(state, request))]
async fn rename_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(request): Json<RenameItemRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RenameInventoryItem {
        correlation_id: Uuid::new_v4(),
        item_id,
        new_name: request.new_name,
        original_version: request.original_version,
    };
    let result = command_handlers::handle_rename_inventory_item(
        &command,
        state.clock.as_ref(),
        &state.repository,
    )
    .await?;
    Ok(Json(result.into()))
}

/// POST /{id}/check-in
#[instrument(skip(state, request))]
async fn check_in_items(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(request): Json<StockMovementRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::CheckInItemsToInventory {
        correlation_id: Uuid::new_v4(),
        item_id,
        count: request.count,
        original_version: request.original_version,
    };
    let result =
        command_handlers::handle_check_in_items(&command, state.clock.as_ref(), &state.repository)
            .await?;
    Ok(Json(result.into()))
}

/// POST /{id}/remove
#[instrument(skip(state, request))]
async fn remove_items(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(request): Json<StockMovementRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RemoveItemsFromInventory {
        correlation_id: Uuid::new_v4(),
        item_id,
        count: request.count,
        original_version: request.original_version,
    };
    let result =
        command_handlers::handle_remove_items(&command, state.clock.as_ref(), &state.repository)
            .await?;
    Ok(Json(result.into()))
}

/// POST /{id}/deactivate
#[instrument(skip(state, request))]
async fn deactivate_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    request: Option<Json<DeactivateItemRequest>>,
) -> Result<Json<CommandResponse>, ApiError> {
    let request = request.map(|Json(body)| body).unwrap_or_default();
    let command = commands::DeactivateInventoryItem {
        correlation_id: Uuid::new_v4(),
        item_id,
        original_version: request.original_version,
    };
    let result = command_handlers::handle_deactivate_inventory_item(
        &command,
        state.clock.as_ref(),
        &state.repository,
    )
    .await?;
    Ok(Json(result.into()))
}

/// GET /
async fn list_items(State(state): State<AppState>) -> Json<Vec<InventoryItemListDto>> {
    Json(query_handlers::get_inventory_items(state.read_model.as_ref()))
}

/// GET /{id}
#[instrument(skip(state))]
async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<InventoryItemDetailsDto>, ApiError> {
    let details = query_handlers::get_inventory_item_details(item_id, state.read_model.as_ref())?;
    Ok(Json(details))
}

/// Returns the router for the inventory context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_item).get(list_items))
        .route("/{id}", get(get_item))
        .route("/{id}/rename", post(rename_item))
        .route("/{id}/check-in", post(check_in_items))
        .route("/{id}/remove", post(remove_items))
        .route("/{id}/deactivate", post(deactivate_item))
}
