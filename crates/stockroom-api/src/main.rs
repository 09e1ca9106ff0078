//! Stockroom API server entry point.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use stockroom_api::config::ApiConfig;
use stockroom_api::error::AppError;
use stockroom_api::state::AppState;
use stockroom_core::clock::SystemClock;
use stockroom_core::event_log::EventLog;
use stockroom_event_store::in_memory_event_log::InMemoryEventLog;
use stockroom_event_store::pg_event_log::PgEventLog;
use stockroom_inventory::read_model::InventoryReadModelStore;
use tracing_subscriber::EnvFilter;

async fn event_log(config: &ApiConfig) -> Result<Arc<dyn EventLog>, AppError> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set; events are kept in memory only");
        return Ok(Arc::new(InMemoryEventLog::new()));
    };
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await?;
    let log = PgEventLog::new(pool);
    log.ensure_schema().await?;
    Ok(Arc::new(log))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Stockroom API server");

    let config = ApiConfig::from_env()?;
    let log = event_log(&config).await?;

    // Read models live in memory; rebuild them from the log before serving.
    let store = Arc::new(InventoryReadModelStore::new());
    let app_state = AppState::new(Arc::new(SystemClock), log, store);
    let replayed = app_state.repository.replay_projections().await?;
    tracing::info!(replayed, "read model rebuilt");

    let app = stockroom_api::app(app_state);

    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
