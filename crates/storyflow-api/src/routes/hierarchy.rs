//! Structure queries over the open draft: spanning tree, paths and tree
//! checks. Mounted under the draft router.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use serde::{Deserialize, Serialize};
use storyflow_draft::application::command_handlers::lock;
use storyflow_draft::application::query_handlers;
use storyflow_graph::{Hierarchy, TreeValidation};

use crate::error::ApiError;
use crate::state::AppState;

/// Query string for GET /path.
#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub from: String,
    pub to: String,
}

/// Response body for GET /path.
#[derive(Debug, Serialize)]
pub struct PathResponse {
    pub from: String,
    pub to: String,
    /// Node ids from `from` to `to`, both included; `null` when `to` is not
    /// below `from` in the tree.
    pub path: Option<Vec<String>>,
}

/// GET /hierarchy
async fn hierarchy(State(state): State<AppState>) -> Result<Json<Option<Hierarchy>>, ApiError> {
    Ok(Json(query_handlers::get_hierarchy(&lock(&state.workspace))?))
}

/// GET /path?from=...&to=...
async fn path(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<PathResponse>, ApiError> {
    let path = query_handlers::find_path(&lock(&state.workspace), &query.from, &query.to)?;
    Ok(Json(PathResponse {
        from: query.from,
        to: query.to,
        path,
    }))
}

/// GET /tree-validation
async fn tree_validation(State(state): State<AppState>) -> Result<Json<TreeValidation>, ApiError> {
    Ok(Json(query_handlers::get_tree_validation(&lock(
        &state.workspace,
    ))?))
}

/// Returns the structure query router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hierarchy", get(hierarchy))
        .route("/path", get(path))
        .route("/tree-validation", get(tree_validation))
}
