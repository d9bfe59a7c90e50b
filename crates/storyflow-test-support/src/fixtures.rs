//! Graph fixtures shared across test suites.

use chrono::{DateTime, TimeZone, Utc};
use storyflow_graph::domain::editor::{self, Connection};
use storyflow_graph::{GraphDocument, GraphKind, NodeType};

/// The instant every fixture is stamped with.
///
/// # Panics
///
/// Never; the date is a valid constant.
#[must_use]
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// A valid graph: `start` (ACT) → `end` (END).
#[must_use]
pub fn linear_graph(id: &str, kind: GraphKind) -> GraphDocument {
    let mut graph =
        GraphDocument::new(id, "project-1", kind, format!("Graph {id}"), fixed_time());
    graph
        .flow
        .nodes
        .push(editor::create_node(NodeType::End, "end", 200.0, 0.0));
    editor::apply_connection(&graph, &Connection::new("start", "end", Some("next")))
}

/// The three-node scenario: `n1` (PLAYER, start) → `choice-0` → `n2`
/// (CHARACTER) → `n3` (END).
#[must_use]
pub fn scenario_graph() -> GraphDocument {
    let mut graph = GraphDocument::new(
        "scenario",
        "project-1",
        GraphKind::Narrative,
        "Scenario",
        fixed_time(),
    );
    graph.flow.nodes = vec![
        editor::create_node(NodeType::Player, "n1", 0.0, 0.0),
        editor::create_node(NodeType::Character, "n2", 200.0, 0.0),
        editor::create_node(NodeType::End, "n3", 400.0, 0.0),
    ];
    "n1".clone_into(&mut graph.start_node_id);
    let graph = editor::apply_connection(&graph, &Connection::new("n1", "n2", Some("choice-0")));
    editor::apply_connection(&graph, &Connection::new("n2", "n3", Some("next")))
}
