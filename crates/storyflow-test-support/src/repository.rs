//! Test repositories: mock `GraphRepository` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use storyflow_core::error::StoryError;
use storyflow_graph::{GraphDocument, GraphKind, GraphPatch, GraphRepository, GraphSummary, NewGraph};

use crate::fixtures::fixed_time;

/// A graph repository backed by a map that records every call.
///
/// Created graphs get ids `created-1`, `created-2`, ... and the fixture
/// timestamp.
#[derive(Debug, Default)]
pub struct RecordingGraphRepository {
    graphs: Mutex<HashMap<String, GraphDocument>>,
    get_calls: Mutex<Vec<String>>,
    updates: Mutex<Vec<(String, GraphPatch)>>,
}

impl RecordingGraphRepository {
    /// Create a repository pre-populated with `graphs`.
    #[must_use]
    pub fn new(graphs: Vec<GraphDocument>) -> Self {
        Self {
            graphs: Mutex::new(graphs.into_iter().map(|g| (g.id.clone(), g)).collect()),
            ..Self::default()
        }
    }

    /// Ids passed to `get_graph`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn get_calls(&self) -> Vec<String> {
        self.get_calls.lock().unwrap().clone()
    }

    /// Every `update_graph` call, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn updates(&self) -> Vec<(String, GraphPatch)> {
        self.updates.lock().unwrap().clone()
    }

    /// The stored version of a graph.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stored(&self, graph_id: &str) -> Option<GraphDocument> {
        self.graphs.lock().unwrap().get(graph_id).cloned()
    }
}

#[async_trait]
impl GraphRepository for RecordingGraphRepository {
    async fn get_graph(&self, graph_id: &str) -> Result<GraphDocument, StoryError> {
        self.get_calls.lock().unwrap().push(graph_id.to_owned());
        self.graphs
            .lock()
            .unwrap()
            .get(graph_id)
            .cloned()
            .ok_or_else(|| StoryError::GraphNotFound(graph_id.to_owned()))
    }

    async fn create_graph(&self, new_graph: NewGraph) -> Result<GraphDocument, StoryError> {
        let mut graphs = self.graphs.lock().unwrap();
        let id = format!("created-{}", graphs.len() + 1);
        let graph = GraphDocument::new(
            id.clone(),
            new_graph.project_id,
            new_graph.kind,
            new_graph.title,
            fixed_time(),
        );
        graphs.insert(id, graph.clone());
        Ok(graph)
    }

    async fn update_graph(
        &self,
        graph_id: &str,
        patch: GraphPatch,
    ) -> Result<GraphDocument, StoryError> {
        self.updates
            .lock()
            .unwrap()
            .push((graph_id.to_owned(), patch.clone()));
        let mut graphs = self.graphs.lock().unwrap();
        let graph = graphs
            .get_mut(graph_id)
            .ok_or_else(|| StoryError::GraphNotFound(graph_id.to_owned()))?;
        patch.apply_to(graph, fixed_time());
        Ok(graph.clone())
    }

    async fn list_graphs(
        &self,
        project_id: &str,
        kind: Option<GraphKind>,
    ) -> Result<Vec<GraphSummary>, StoryError> {
        let graphs = self.graphs.lock().unwrap();
        let mut summaries: Vec<GraphSummary> = graphs
            .values()
            .filter(|g| g.project_id == project_id && kind.is_none_or(|k| g.kind == k))
            .map(GraphSummary::from)
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }
}

/// A graph repository that always returns an infrastructure error. Useful for
/// testing resolution failures and persistence errors on commit.
#[derive(Debug)]
pub struct FailingGraphRepository;

#[async_trait]
impl GraphRepository for FailingGraphRepository {
    async fn get_graph(&self, _graph_id: &str) -> Result<GraphDocument, StoryError> {
        Err(StoryError::Infrastructure("connection refused".into()))
    }

    async fn create_graph(&self, _new_graph: NewGraph) -> Result<GraphDocument, StoryError> {
        Err(StoryError::Infrastructure("connection refused".into()))
    }

    async fn update_graph(
        &self,
        _graph_id: &str,
        _patch: GraphPatch,
    ) -> Result<GraphDocument, StoryError> {
        Err(StoryError::Infrastructure("connection refused".into()))
    }

    async fn list_graphs(
        &self,
        _project_id: &str,
        _kind: Option<GraphKind>,
    ) -> Result<Vec<GraphSummary>, StoryError> {
        Err(StoryError::Infrastructure("connection refused".into()))
    }
}
