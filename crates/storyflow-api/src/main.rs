//! Storyflow API server entry point.

use std::sync::Arc;

use storyflow_api::config::Config;
use storyflow_api::error::AppError;
use storyflow_api::state::AppState;
use storyflow_core::clock::{Clock, SystemClock};
use storyflow_core::ids::{IdGenerator, UuidIdGenerator};
use storyflow_event_bus::LoggingHandler;
use storyflow_graph::domain::events::ALL_EVENT_TYPES;
use storyflow_graph_store::MemoryGraphRepository;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Storyflow API server");

    let config = Config::from_env()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ids: Arc<dyn IdGenerator> = Arc::new(UuidIdGenerator);

    let repository = match &config.seed_dir {
        Some(dir) => MemoryGraphRepository::from_seed_dir(dir, clock.clone(), ids.clone()).await?,
        None => MemoryGraphRepository::new(clock.clone(), ids.clone()),
    };
    tracing::info!(graphs = repository.len(), "graph store ready");

    let app_state = AppState::new(clock, ids, Arc::new(repository));
    for event_type in ALL_EVENT_TYPES {
        app_state
            .bus
            .subscribe(event_type, Arc::new(LoggingHandler))
            .map_err(|e| AppError::Config(e.to_string()))?;
    }

    // TODO: Replace CorsLayer::permissive() with the editor's origin once it is configurable.
    let app = storyflow_api::build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
