//! Routes for per-scope breadcrumb history.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use serde::Deserialize;
use storyflow_core::error::StoryError;
use storyflow_draft::application::command_handlers::{self, lock};
use storyflow_draft::application::query_handlers::{self, DraftView};
use storyflow_draft::domain::commands;
use storyflow_graph::GraphKind;
use storyflow_navigation::Breadcrumb;
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{scope}/navigate.
#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub index: usize,
}

fn parse_scope(raw: &str) -> Result<GraphKind, ApiError> {
    raw.parse().map_err(|e| ApiError(StoryError::InvalidInput(e)))
}

/// GET /{scope}
async fn list_breadcrumbs(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> Result<Json<Vec<Breadcrumb>>, ApiError> {
    let scope = parse_scope(&scope)?;
    let crumbs = lock(&state.workspace)
        .breadcrumbs
        .breadcrumbs(scope)
        .to_vec();
    Ok(Json(crumbs))
}

/// POST /{scope}/pop
async fn pop_breadcrumb(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> Result<Json<Option<Breadcrumb>>, ApiError> {
    let scope = parse_scope(&scope)?;
    Ok(Json(lock(&state.workspace).breadcrumbs.pop(scope)))
}

/// POST /{scope}/navigate
#[instrument(skip(state, request), fields(index = request.index))]
async fn navigate(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Json(request): Json<NavigateRequest>,
) -> Result<Json<DraftView>, ApiError> {
    let command = commands::NavigateBreadcrumb {
        correlation_id: Uuid::new_v4(),
        scope: parse_scope(&scope)?,
        index: request.index,
    };

    command_handlers::handle_navigate_breadcrumb(
        &command,
        &state.workspace,
        &*state.repository,
        &state.bus,
    )
    .await?;

    let view = query_handlers::get_draft_view(&lock(&state.workspace))?;
    Ok(Json(view))
}

/// DELETE /{scope}
async fn clear_breadcrumbs(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> Result<StatusCode, ApiError> {
    let scope = parse_scope(&scope)?;
    lock(&state.workspace).breadcrumbs.clear(scope);
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for breadcrumb history.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{scope}", get(list_breadcrumbs).delete(clear_breadcrumbs))
        .route("/{scope}/pop", post(pop_breadcrumb))
        .route("/{scope}/navigate", post(navigate))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use storyflow_test_support::{
        FixedClock, RecordingGraphRepository, SequenceIds, fixed_time, linear_graph,
    };
    use tower::ServiceExt;

    fn state_with_history() -> AppState {
        let state = AppState::new(
            Arc::new(FixedClock(fixed_time())),
            Arc::new(SequenceIds::default()),
            Arc::new(RecordingGraphRepository::new(vec![
                linear_graph("g1", GraphKind::Narrative),
                linear_graph("g2", GraphKind::Narrative),
            ])),
        );
        {
            let mut workspace = lock(&state.workspace);
            workspace
                .breadcrumbs
                .push(Breadcrumb::new("g1", "Graph g1", GraphKind::Narrative));
            workspace
                .breadcrumbs
                .push(Breadcrumb::new("g2", "Graph g2", GraphKind::Narrative));
        }
        state
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router().with_state(state).oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_list_breadcrumbs_accepts_lowercase_scope() {
        let request = Request::builder()
            .uri("/narrative")
            .body(Body::empty())
            .unwrap();

        let (status, json) = send(state_with_history(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[1]["graphId"], "g2");
    }

    #[tokio::test]
    async fn test_unknown_scope_returns_400() {
        let request = Request::builder()
            .uri("/chapter")
            .body(Body::empty())
            .unwrap();

        let (status, json) = send(state_with_history(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid_input");
    }

    #[tokio::test]
    async fn test_navigate_truncates_and_opens_target() {
        // Arrange
        let state = state_with_history();
        let request = Request::builder()
            .method("POST")
            .uri("/NARRATIVE/navigate")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"index":0}"#))
            .unwrap();

        // Act
        let (status, json) = send(state.clone(), request).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["graphId"], "g1");
        assert_eq!(
            lock(&state.workspace)
                .breadcrumbs
                .breadcrumbs(GraphKind::Narrative)
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_navigate_out_of_range_returns_400() {
        let request = Request::builder()
            .method("POST")
            .uri("/storylet/navigate")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"index":4}"#))
            .unwrap();

        let (status, _) = send(state_with_history(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pop_then_clear() {
        let state = state_with_history();

        let (status, popped) = send(
            state.clone(),
            Request::builder()
                .method("POST")
                .uri("/narrative/pop")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        let (cleared, _) = send(
            state.clone(),
            Request::builder()
                .method("DELETE")
                .uri("/narrative")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(popped["graphId"], "g2");
        assert_eq!(cleared, StatusCode::NO_CONTENT);
        assert!(
            lock(&state.workspace)
                .breadcrumbs
                .breadcrumbs(GraphKind::Narrative)
                .is_empty()
        );
    }
}
