//! Commands for the draft workflow.

use storyflow_core::command::Command;
use storyflow_graph::{EditOperation, GraphKind};
use uuid::Uuid;

/// Command to open a graph for editing.
#[derive(Debug, Clone)]
pub struct OpenGraph {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The graph to open.
    pub graph_id: String,
}

impl Command for OpenGraph {
    fn command_type(&self) -> &'static str {
        "draft.open_graph"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to create a new graph in a project.
#[derive(Debug, Clone)]
pub struct CreateGraph {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The owning project.
    pub project_id: String,
    /// Narrative or storylet.
    pub kind: GraphKind,
    /// Display title.
    pub title: String,
}

impl Command for CreateGraph {
    fn command_type(&self) -> &'static str {
        "draft.create_graph"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to apply one edit to the open draft.
#[derive(Debug, Clone)]
pub struct ApplyEdit {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The edit to apply.
    pub operation: EditOperation,
}

impl Command for ApplyEdit {
    fn command_type(&self) -> &'static str {
        "draft.apply_edit"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to commit the open draft.
#[derive(Debug, Clone)]
pub struct CommitDraft {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for CommitDraft {
    fn command_type(&self) -> &'static str {
        "draft.commit_draft"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to throw away uncommitted edits.
#[derive(Debug, Clone)]
pub struct DiscardDraft {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for DiscardDraft {
    fn command_type(&self) -> &'static str {
        "draft.discard_draft"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to jump back to an earlier breadcrumb.
#[derive(Debug, Clone)]
pub struct NavigateBreadcrumb {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Which history stack.
    pub scope: GraphKind,
    /// Index into that stack; the stack is truncated after it.
    pub index: usize,
}

impl Command for NavigateBreadcrumb {
    fn command_type(&self) -> &'static str {
        "draft.navigate_breadcrumb"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
