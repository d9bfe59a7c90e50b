//! Routes for editing, committing and discarding the open draft.

use axum::extract::State;
use axum::{Json, Router, routing::get, routing::post};
use storyflow_draft::application::command_handlers::{self, EditOutcome, lock};
use storyflow_draft::application::query_handlers::{self, DraftView};
use storyflow_draft::domain::commands;
use storyflow_draft::domain::delta::Delta;
use storyflow_draft::domain::draft::CommitOutcome;
use storyflow_graph::{EditOperation, GraphDocument, ValidationReport};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::hierarchy;
use crate::state::AppState;

/// GET /
async fn draft_view(State(state): State<AppState>) -> Result<Json<DraftView>, ApiError> {
    let view = query_handlers::get_draft_view(&lock(&state.workspace))?;
    Ok(Json(view))
}

/// GET /committed
async fn committed_graph(State(state): State<AppState>) -> Result<Json<GraphDocument>, ApiError> {
    let graph = query_handlers::get_committed_graph(&lock(&state.workspace))?;
    Ok(Json(graph))
}

/// POST /edits
#[instrument(skip(state, operation), fields(operation = operation.name()))]
async fn apply_edit(
    State(state): State<AppState>,
    Json(operation): Json<EditOperation>,
) -> Result<Json<EditOutcome>, ApiError> {
    let command = commands::ApplyEdit {
        correlation_id: Uuid::new_v4(),
        operation,
    };

    let outcome = command_handlers::handle_apply_edit(
        &command,
        &mut lock(&state.workspace),
        state.clock.as_ref(),
    )?;
    Ok(Json(outcome))
}

/// POST /commit
#[instrument(skip(state))]
async fn commit_draft(State(state): State<AppState>) -> Result<Json<CommitOutcome>, ApiError> {
    let command = commands::CommitDraft {
        correlation_id: Uuid::new_v4(),
    };

    let outcome = command_handlers::handle_commit_draft(
        &command,
        &state.workspace,
        &*state.repository,
        &state.bus,
        state.clock.as_ref(),
    )
    .await?;
    Ok(Json(outcome))
}

/// POST /discard
#[instrument(skip(state))]
async fn discard_draft(State(state): State<AppState>) -> Result<Json<DraftView>, ApiError> {
    let command = commands::DiscardDraft {
        correlation_id: Uuid::new_v4(),
    };

    let mut workspace = lock(&state.workspace);
    command_handlers::handle_discard_draft(&command, &mut workspace)?;
    Ok(Json(query_handlers::get_draft_view(&workspace)?))
}

/// GET /deltas
async fn deltas(State(state): State<AppState>) -> Result<Json<Vec<Delta>>, ApiError> {
    Ok(Json(query_handlers::get_deltas(&lock(&state.workspace))?))
}

/// GET /validation
async fn validation(
    State(state): State<AppState>,
) -> Result<Json<Option<ValidationReport>>, ApiError> {
    Ok(Json(query_handlers::get_validation(&lock(
        &state.workspace,
    ))?))
}

/// Returns the router for the open draft, including its structure queries.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(draft_view))
        .route("/committed", get(committed_graph))
        .route("/edits", post(apply_edit))
        .route("/commit", post(commit_draft))
        .route("/discard", post(discard_draft))
        .route("/deltas", get(deltas))
        .route("/validation", get(validation))
        .merge(hierarchy::router())
}
