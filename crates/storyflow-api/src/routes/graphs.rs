//! Routes for creating, listing and opening graphs.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use storyflow_draft::application::command_handlers::{self, lock};
use storyflow_draft::application::query_handlers::{self, DraftView};
use storyflow_draft::domain::cache::ResolutionStatus;
use storyflow_draft::domain::commands;
use storyflow_graph::{GraphDocument, GraphKind, GraphSummary};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGraphRequest {
    pub project_id: String,
    pub kind: GraphKind,
    pub title: String,
}

/// Query string for GET /.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGraphsQuery {
    pub project_id: String,
    #[serde(default)]
    pub kind: Option<GraphKind>,
}

/// Response body for GET /{graph_id}/status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResponse {
    pub graph_id: String,
    /// `null` when the graph was never requested.
    pub resolution: Option<ResolutionStatus>,
}

/// POST /
#[instrument(skip(state, request), fields(project_id = %request.project_id))]
async fn create_graph(
    State(state): State<AppState>,
    Json(request): Json<CreateGraphRequest>,
) -> Result<(StatusCode, Json<GraphDocument>), ApiError> {
    let command = commands::CreateGraph {
        correlation_id: Uuid::new_v4(),
        project_id: request.project_id,
        kind: request.kind,
        title: request.title,
    };

    let graph = command_handlers::handle_create_graph(
        &command,
        &state.workspace,
        &*state.repository,
        &state.bus,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(graph)))
}

/// GET /?projectId=...&kind=...
async fn list_graphs(
    State(state): State<AppState>,
    Query(query): Query<ListGraphsQuery>,
) -> Result<Json<Vec<GraphSummary>>, ApiError> {
    let summaries =
        query_handlers::list_graphs(&query.project_id, query.kind, &*state.repository).await?;
    Ok(Json(summaries))
}

/// POST /{graph_id}/open
#[instrument(skip(state))]
async fn open_graph(
    State(state): State<AppState>,
    Path(graph_id): Path<String>,
) -> Result<Json<DraftView>, ApiError> {
    let command = commands::OpenGraph {
        correlation_id: Uuid::new_v4(),
        graph_id,
    };

    command_handlers::handle_open_graph(&command, &state.workspace, &*state.repository).await?;

    let view = query_handlers::get_draft_view(&lock(&state.workspace))?;
    Ok(Json(view))
}

/// GET /{graph_id}/status
async fn resolution_status(
    State(state): State<AppState>,
    Path(graph_id): Path<String>,
) -> Json<ResolutionResponse> {
    let resolution = query_handlers::get_resolution_status(&lock(&state.workspace), &graph_id);
    Json(ResolutionResponse {
        graph_id,
        resolution,
    })
}

/// Returns the router for graph resources.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_graphs).post(create_graph))
        .route("/{graph_id}/open", post(open_graph))
        .route("/{graph_id}/status", get(resolution_status))
}
