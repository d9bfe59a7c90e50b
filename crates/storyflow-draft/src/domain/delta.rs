//! Recorded edits and the replayable diffs they carry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyflow_graph::{EditOperation, EndNode, FlowEdge, FlowNode, GraphDocument};

/// Node, edge and end-node difference between two versions of a graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDiff {
    #[serde(default)]
    pub upserted_nodes: Vec<FlowNode>,
    #[serde(default)]
    pub removed_node_ids: Vec<String>,
    #[serde(default)]
    pub upserted_edges: Vec<FlowEdge>,
    #[serde(default)]
    pub removed_edge_ids: Vec<String>,
    /// Replacement end-node list, present only when it changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_node_ids: Option<Vec<EndNode>>,
}

impl GraphDiff {
    /// Computes the diff that turns `before` into `after`.
    #[must_use]
    pub fn between(before: &GraphDocument, after: &GraphDocument) -> Self {
        let upserted_nodes = after
            .flow
            .nodes
            .iter()
            .filter(|n| before.node(&n.id) != Some(*n))
            .cloned()
            .collect();
        let removed_node_ids = before
            .flow
            .nodes
            .iter()
            .filter(|n| !after.contains_node(&n.id))
            .map(|n| n.id.clone())
            .collect();
        let upserted_edges = after
            .flow
            .edges
            .iter()
            .filter(|e| before.edge(&e.id) != Some(*e))
            .cloned()
            .collect();
        let removed_edge_ids = before
            .flow
            .edges
            .iter()
            .filter(|e| after.edge(&e.id).is_none())
            .map(|e| e.id.clone())
            .collect();
        let end_node_ids =
            (before.end_node_ids != after.end_node_ids).then(|| after.end_node_ids.clone());

        Self {
            upserted_nodes,
            removed_node_ids,
            upserted_edges,
            removed_edge_ids,
            end_node_ids,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upserted_nodes.is_empty()
            && self.removed_node_ids.is_empty()
            && self.upserted_edges.is_empty()
            && self.removed_edge_ids.is_empty()
            && self.end_node_ids.is_none()
    }

    /// Replays this diff onto `graph`: removals first, then upserts
    /// (replaced in place when the id exists, appended otherwise).
    pub fn apply_to(&self, graph: &mut GraphDocument) {
        graph
            .flow
            .nodes
            .retain(|n| !self.removed_node_ids.contains(&n.id));
        for node in &self.upserted_nodes {
            match graph.flow.nodes.iter_mut().find(|n| n.id == node.id) {
                Some(existing) => existing.clone_from(node),
                None => graph.flow.nodes.push(node.clone()),
            }
        }

        graph
            .flow
            .edges
            .retain(|e| !self.removed_edge_ids.contains(&e.id));
        for edge in &self.upserted_edges {
            match graph.flow.edges.iter_mut().find(|e| e.id == edge.id) {
                Some(existing) => existing.clone_from(edge),
                None => graph.flow.edges.push(edge.clone()),
            }
        }

        if let Some(end_node_ids) = &self.end_node_ids {
            graph.end_node_ids.clone_from(end_node_ids);
        }
    }
}

/// One edit applied to the draft since the last commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    /// Position in the draft's edit log; assigned when applied.
    pub sequence: u64,
    pub operation: EditOperation,
    pub diff: GraphDiff,
    pub recorded_at: DateTime<Utc>,
}

impl Delta {
    /// Records `operation` as the change from `before` to `after`.
    #[must_use]
    pub fn capture(
        operation: EditOperation,
        before: &GraphDocument,
        after: &GraphDocument,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sequence: 0,
            operation,
            diff: GraphDiff::between(before, after),
            recorded_at,
        }
    }
}
