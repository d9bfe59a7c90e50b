//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use storyflow_graph::GraphDocument;
use storyflow_graph_store::MemoryGraphRepository;
use storyflow_test_support::{FixedClock, SequenceIds, fixed_time};
use tower::ServiceExt;

use storyflow_api::build_router;
use storyflow_api::state::AppState;

/// Build application state over a real in-memory store holding `graphs`,
/// with a fixed clock and sequential ids.
pub fn build_test_state(graphs: Vec<GraphDocument>) -> AppState {
    let clock = Arc::new(FixedClock(fixed_time()));
    let repository = MemoryGraphRepository::new(clock.clone(), Arc::new(SequenceIds::new("graph")));
    for graph in graphs {
        repository.insert(graph);
    }
    AppState::new(clock, Arc::new(SequenceIds::new("evt")), Arc::new(repository))
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    build_router(state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}
