//! Persistence seam for graph documents.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyflow_core::error::StoryError;

use super::document::{EndNode, Flow, GraphDocument, GraphKind};

/// Input for creating a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGraph {
    pub project_id: String,
    pub kind: GraphKind,
    pub title: String,
}

/// Fields written back on update. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_node_ids: Option<Vec<EndNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<Flow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiled_output: Option<String>,
}

impl GraphPatch {
    /// A patch that writes every authored field of `graph`.
    #[must_use]
    pub fn from_document(graph: &GraphDocument) -> Self {
        Self {
            title: Some(graph.title.clone()),
            start_node_id: Some(graph.start_node_id.clone()),
            end_node_ids: Some(graph.end_node_ids.clone()),
            flow: Some(graph.flow.clone()),
            compiled_output: graph.compiled_output.clone(),
        }
    }

    /// Applies this patch to `graph`, stamping `updated_at`.
    pub fn apply_to(self, graph: &mut GraphDocument, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            graph.title = title;
        }
        if let Some(start_node_id) = self.start_node_id {
            graph.start_node_id = start_node_id;
        }
        if let Some(end_node_ids) = self.end_node_ids {
            graph.end_node_ids = end_node_ids;
        }
        if let Some(flow) = self.flow {
            graph.flow = flow;
        }
        if self.compiled_output.is_some() {
            graph.compiled_output = self.compiled_output;
        }
        graph.updated_at = now;
    }
}

/// Listing entry for a project's graphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    pub id: String,
    pub project_id: String,
    pub kind: GraphKind,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

impl From<&GraphDocument> for GraphSummary {
    fn from(graph: &GraphDocument) -> Self {
        Self {
            id: graph.id.clone(),
            project_id: graph.project_id.clone(),
            kind: graph.kind,
            title: graph.title.clone(),
            updated_at: graph.updated_at,
        }
    }
}

/// Repository trait for loading and storing graph documents.
///
/// Implementations report an unknown id as `StoryError::GraphNotFound`.
#[async_trait]
pub trait GraphRepository: Send + Sync {
    /// Load one graph.
    async fn get_graph(&self, graph_id: &str) -> Result<GraphDocument, StoryError>;

    /// Create a graph holding only its start node.
    async fn create_graph(&self, new_graph: NewGraph) -> Result<GraphDocument, StoryError>;

    /// Write `patch` onto a stored graph and return the result.
    async fn update_graph(
        &self,
        graph_id: &str,
        patch: GraphPatch,
    ) -> Result<GraphDocument, StoryError>;

    /// List a project's graphs, optionally filtered by kind.
    async fn list_graphs(
        &self,
        project_id: &str,
        kind: Option<GraphKind>,
    ) -> Result<Vec<GraphSummary>, StoryError>;
}
