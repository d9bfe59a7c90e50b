//! In-memory implementation of the `GraphRepository` trait.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use storyflow_core::clock::Clock;
use storyflow_core::error::StoryError;
use storyflow_core::ids::IdGenerator;
use storyflow_graph::{
    GraphDocument, GraphKind, GraphPatch, GraphRepository, GraphSummary, NewGraph,
};
use tracing::{debug, instrument};

use crate::seed::{SeedError, load_seed_dir};

/// Graph documents held in a process-local map.
pub struct MemoryGraphRepository {
    graphs: RwLock<HashMap<String, GraphDocument>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl fmt::Debug for MemoryGraphRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryGraphRepository")
            .field("graphs", &self.len())
            .finish_non_exhaustive()
    }
}

impl MemoryGraphRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            graphs: RwLock::new(HashMap::new()),
            clock,
            ids,
        }
    }

    /// Creates a repository holding every seed document found in `dir`.
    ///
    /// # Errors
    ///
    /// Returns the `SeedError` of the first file that fails to load.
    pub async fn from_seed_dir(
        dir: &Path,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self, SeedError> {
        let repo = Self::new(clock, ids);
        for graph in load_seed_dir(dir).await? {
            repo.insert(graph);
        }
        Ok(repo)
    }

    /// Stores `graph`, replacing any graph with the same id.
    pub fn insert(&self, graph: GraphDocument) {
        self.graphs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(graph.id.clone(), graph);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl GraphRepository for MemoryGraphRepository {
    async fn get_graph(&self, graph_id: &str) -> Result<GraphDocument, StoryError> {
        self.graphs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(graph_id)
            .cloned()
            .ok_or_else(|| StoryError::GraphNotFound(graph_id.to_owned()))
    }

    #[instrument(skip_all, fields(project_id = %new_graph.project_id, kind = %new_graph.kind))]
    async fn create_graph(&self, new_graph: NewGraph) -> Result<GraphDocument, StoryError> {
        if new_graph.title.trim().is_empty() {
            return Err(StoryError::InvalidInput("graph title must not be empty".into()));
        }
        let graph = GraphDocument::new(
            self.ids.next_id(),
            new_graph.project_id,
            new_graph.kind,
            new_graph.title,
            self.clock.now(),
        );
        debug!(graph_id = %graph.id, "graph created");
        self.insert(graph.clone());
        Ok(graph)
    }

    async fn update_graph(
        &self,
        graph_id: &str,
        patch: GraphPatch,
    ) -> Result<GraphDocument, StoryError> {
        let mut graphs = self.graphs.write().unwrap_or_else(PoisonError::into_inner);
        let graph = graphs
            .get_mut(graph_id)
            .ok_or_else(|| StoryError::GraphNotFound(graph_id.to_owned()))?;
        patch.apply_to(graph, self.clock.now());
        debug!(graph_id, "graph updated");
        Ok(graph.clone())
    }

    async fn list_graphs(
        &self,
        project_id: &str,
        kind: Option<GraphKind>,
    ) -> Result<Vec<GraphSummary>, StoryError> {
        let graphs = self.graphs.read().unwrap_or_else(PoisonError::into_inner);
        let mut summaries: Vec<GraphSummary> = graphs
            .values()
            .filter(|g| g.project_id == project_id && kind.is_none_or(|k| g.kind == k))
            .map(GraphSummary::from)
            .collect();
        summaries.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        Ok(summaries)
    }
}
