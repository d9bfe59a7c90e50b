//! Query handlers for the draft workflow.
//!
//! Queries read the workspace without mutating it and return owned view
//! DTOs. Structure queries run against the draft buffer, which is what the
//! author is looking at.

use chrono::{DateTime, Utc};
use serde::Serialize;
use storyflow_core::error::StoryError;
use storyflow_graph::domain::hierarchy::{create_hierarchy, validate_tree_structure};
use storyflow_graph::{
    GraphDocument, GraphKind, GraphRepository, GraphSummary, Hierarchy, TreeValidation,
    ValidationReport,
};

use crate::application::workspace::Workspace;
use crate::domain::cache::ResolutionStatus;
use crate::domain::delta::Delta;

/// Read-only view of the open draft.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    /// The edited graph.
    pub graph_id: String,
    /// The draft buffer.
    pub draft: GraphDocument,
    pub has_uncommitted_changes: bool,
    /// Number of deltas applied since the last commit.
    pub delta_count: usize,
    pub last_committed_at: Option<DateTime<Utc>>,
    pub validation: Option<ValidationReport>,
}

/// Returns the open draft.
///
/// # Errors
///
/// Returns `StoryError::NoActiveGraph` when nothing is open.
pub fn get_draft_view(workspace: &Workspace) -> Result<DraftView, StoryError> {
    let draft = workspace.draft()?;
    Ok(DraftView {
        graph_id: draft.graph_id().to_owned(),
        draft: draft.draft_graph().clone(),
        has_uncommitted_changes: draft.has_uncommitted_changes(),
        delta_count: draft.deltas().len(),
        last_committed_at: draft.last_committed_at(),
        validation: draft.validation().cloned(),
    })
}

/// Returns the committed buffer of the open graph.
///
/// # Errors
///
/// Returns `StoryError::NoActiveGraph` when nothing is open.
pub fn get_committed_graph(workspace: &Workspace) -> Result<GraphDocument, StoryError> {
    Ok(workspace.draft()?.committed_graph().clone())
}

/// Returns the uncommitted delta log, oldest first.
///
/// # Errors
///
/// Returns `StoryError::NoActiveGraph` when nothing is open.
pub fn get_deltas(workspace: &Workspace) -> Result<Vec<Delta>, StoryError> {
    Ok(workspace.draft()?.deltas().to_vec())
}

/// Returns the draft's current diagnostics.
///
/// # Errors
///
/// Returns `StoryError::NoActiveGraph` when nothing is open.
pub fn get_validation(workspace: &Workspace) -> Result<Option<ValidationReport>, StoryError> {
    Ok(workspace.draft()?.validation().cloned())
}

/// Builds the spanning tree of the draft. `None` when the draft has no
/// start node.
///
/// # Errors
///
/// Returns `StoryError::NoActiveGraph` when nothing is open.
pub fn get_hierarchy(workspace: &Workspace) -> Result<Option<Hierarchy>, StoryError> {
    Ok(create_hierarchy(workspace.draft()?.draft_graph()))
}

/// Finds the tree path between two nodes of the draft, both ends included.
///
/// # Errors
///
/// Returns `StoryError::NoActiveGraph` when nothing is open.
pub fn find_path(
    workspace: &Workspace,
    from: &str,
    to: &str,
) -> Result<Option<Vec<String>>, StoryError> {
    let hierarchy = get_hierarchy(workspace)?;
    Ok(hierarchy.and_then(|h| h.find_path(from, to)))
}

/// Runs the structural tree check on the draft.
///
/// # Errors
///
/// Returns `StoryError::NoActiveGraph` when nothing is open.
pub fn get_tree_validation(workspace: &Workspace) -> Result<TreeValidation, StoryError> {
    Ok(validate_tree_structure(workspace.draft()?.draft_graph()))
}

/// Where `graph_id` is in its resolution lifecycle, if it was ever requested.
#[must_use]
pub fn get_resolution_status(workspace: &Workspace, graph_id: &str) -> Option<ResolutionStatus> {
    workspace.cache.status(graph_id).cloned()
}

/// Lists a project's graphs straight from the repository.
///
/// # Errors
///
/// Returns the repository error.
pub async fn list_graphs(
    project_id: &str,
    kind: Option<GraphKind>,
    repo: &dyn GraphRepository,
) -> Result<Vec<GraphSummary>, StoryError> {
    repo.list_graphs(project_id, kind).await
}
