//! Storyflow API: HTTP surface over the draft workflow.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the application router. Middleware layers are added by the binary.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/graphs", routes::graphs::router())
        .nest("/api/v1/draft", routes::draft::router())
        .nest("/api/v1/breadcrumbs", routes::breadcrumbs::router())
        .nest("/api/v1/events", routes::events::router())
        .with_state(state)
}
