//! End-to-end authoring flow: create, open, edit, commit, reopen.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use storyflow_graph::domain::events::GRAPH_CHANGED_EVENT_TYPE;
use storyflow_graph::WorkspaceEvent;
use storyflow_test_support::{RecordingHandler, scenario_graph};

#[tokio::test]
async fn test_create_edit_commit_round_trip() {
    let state = common::build_test_state(vec![]);
    let changes: Arc<RecordingHandler<WorkspaceEvent>> = Arc::new(RecordingHandler::new());
    state
        .bus
        .subscribe(GRAPH_CHANGED_EVENT_TYPE, changes.clone())
        .unwrap();
    let app = || common::build_test_app(state.clone());

    // POST /api/v1/graphs: create a narrative
    let (status, json) = common::post_json(
        app(),
        "/api/v1/graphs",
        &json!({ "projectId": "project-1", "kind": "NARRATIVE", "title": "Prologue" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let graph_id = json["id"].as_str().unwrap().to_owned();
    assert_eq!(graph_id, "graph-1");

    // Open it
    let (status, _) =
        common::post_json(app(), &format!("/api/v1/graphs/{graph_id}/open"), &json!({})).await;
    assert_eq!(status, StatusCode::OK);

    // Add a chapter and an ending, wire start -> chapter -> end
    for edit in [
        json!({ "op": "createNode", "nodeType": "CHAPTER", "nodeId": "ch1", "position": { "x": 200.0, "y": 0.0 } }),
        json!({ "op": "createNode", "nodeType": "END", "nodeId": "fin", "position": { "x": 400.0, "y": 0.0 } }),
        json!({ "op": "connect", "source": "start", "target": "ch1", "sourceHandle": "next" }),
        json!({ "op": "connect", "source": "ch1", "target": "fin", "sourceHandle": "next" }),
    ] {
        let (status, _) = common::post_json(app(), "/api/v1/draft/edits", &edit).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, deltas) = common::get_json(app(), "/api/v1/draft/deltas").await;
    assert_eq!(deltas.as_array().unwrap().len(), 4);

    // Commit
    let (status, outcome) = common::post_json(app(), "/api/v1/draft/commit", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["graphId"], "graph-1");
    assert_eq!(outcome["appliedDeltas"], 4);
    assert_eq!(outcome["revision"].as_str().unwrap().len(), 64);

    // Committed buffer and the hierarchy reflect the edits
    let (_, committed) = common::get_json(app(), "/api/v1/draft/committed").await;
    assert_eq!(committed["flow"]["nodes"].as_array().unwrap().len(), 3);
    let (_, path) = common::get_json(app(), "/api/v1/draft/path?from=start&to=fin").await;
    assert_eq!(path["path"], json!(["start", "ch1", "fin"]));

    // Created + committed
    let received = changes.received();
    assert_eq!(received.len(), 2);

    // Listing shows the graph
    let (_, list) = common::get_json(app(), "/api/v1/graphs?projectId=project-1").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["title"], "Prologue");
}

#[tokio::test]
async fn test_deleting_middle_node_blocks_commit() {
    let state = common::build_test_state(vec![scenario_graph()]);
    let app = || common::build_test_app(state.clone());
    common::post_json(app(), "/api/v1/graphs/scenario/open", &json!({})).await;

    let (status, outcome) = common::post_json(
        app(),
        "/api/v1/draft/edits",
        &json!({ "op": "deleteNode", "nodeId": "n2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["diff"]["removedNodeIds"], json!(["n2"]));

    let (_, tree) = common::get_json(app(), "/api/v1/draft/tree-validation").await;
    assert_eq!(tree["valid"], false);
    assert_eq!(tree["errors"][0]["code"], "orphaned_node");
    assert_eq!(tree["errors"][0]["nodeId"], "n3");

    let (status, json) = common::post_json(app(), "/api/v1/draft/commit", &json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "validation_failed");

    // Discarding restores the committed graph
    let (status, view) = common::post_json(app(), "/api/v1/draft/discard", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["draft"]["flow"]["nodes"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_breadcrumbs_follow_opened_graphs() {
    let mut side = scenario_graph();
    "side".clone_into(&mut side.id);
    let state = common::build_test_state(vec![scenario_graph(), side]);
    let app = || common::build_test_app(state.clone());

    common::post_json(app(), "/api/v1/graphs/scenario/open", &json!({})).await;
    common::post_json(app(), "/api/v1/graphs/side/open", &json!({})).await;

    let (_, crumbs) = common::get_json(app(), "/api/v1/breadcrumbs/narrative").await;
    assert_eq!(crumbs.as_array().unwrap().len(), 2);

    let (status, view) = common::post_json(
        app(),
        "/api/v1/breadcrumbs/narrative/navigate",
        &json!({ "index": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["graphId"], "scenario");

    let (_, crumbs) = common::get_json(app(), "/api/v1/breadcrumbs/narrative").await;
    assert_eq!(crumbs.as_array().unwrap().len(), 1);
}
