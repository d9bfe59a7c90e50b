//! Relay for UI events onto the workspace bus.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use storyflow_core::event::EventEnvelope;
use storyflow_graph::WorkspaceEvent;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /
///
/// Accepts `{type, payload}` and returns the stamped envelope.
#[instrument(skip_all)]
async fn publish_event(
    State(state): State<AppState>,
    Json(event): Json<WorkspaceEvent>,
) -> Result<(StatusCode, Json<EventEnvelope<WorkspaceEvent>>), ApiError> {
    let envelope = state.bus.publish(event).await?;
    Ok((StatusCode::ACCEPTED, Json(envelope)))
}

/// GET /handlers
async fn registered_types(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.bus.registry().registered_types())
}

/// Returns the router for the event relay.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(publish_event))
        .route("/handlers", get(registered_types))
}
