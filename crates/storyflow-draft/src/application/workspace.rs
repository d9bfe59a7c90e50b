//! The workspace store: everything an editing session holds, in one value.

use storyflow_core::error::StoryError;
use storyflow_graph::GraphDocument;
use storyflow_navigation::BreadcrumbNavigator;
use tracing::{debug, warn};

use crate::domain::cache::GraphCache;
use crate::domain::draft::DraftManager;

/// Editing session state. Passed explicitly to every handler.
#[derive(Debug, Default)]
pub struct Workspace {
    /// Graphs resolved from persistence.
    pub cache: GraphCache,
    /// Per-scope navigation history.
    pub breadcrumbs: BreadcrumbNavigator,
    draft: Option<DraftManager>,
}

impl Workspace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The open draft.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::NoActiveGraph` when nothing is open.
    pub fn draft(&self) -> Result<&DraftManager, StoryError> {
        self.draft.as_ref().ok_or(StoryError::NoActiveGraph)
    }

    /// The open draft, mutably.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::NoActiveGraph` when nothing is open.
    pub fn draft_mut(&mut self) -> Result<&mut DraftManager, StoryError> {
        self.draft.as_mut().ok_or(StoryError::NoActiveGraph)
    }

    #[must_use]
    pub fn has_draft(&self) -> bool {
        self.draft.is_some()
    }

    /// Makes `graph` the edited graph. Uncommitted edits to a previous,
    /// different graph are dropped; returns whether any were. Reopening the
    /// graph already being edited keeps the session as it is.
    pub fn open(&mut self, graph: GraphDocument) -> bool {
        match &mut self.draft {
            Some(manager) if manager.graph_id() == graph.id => {
                debug!(graph_id = %graph.id, "graph already open");
                false
            }
            Some(manager) => {
                let dropped = manager.has_uncommitted_changes();
                if dropped {
                    warn!(
                        graph_id = %manager.graph_id(),
                        deltas = manager.deltas().len(),
                        "discarding uncommitted changes"
                    );
                }
                manager.reset_draft(graph);
                dropped
            }
            None => {
                self.draft = Some(DraftManager::new(graph));
                false
            }
        }
    }
}
