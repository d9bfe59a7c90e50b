//! Domain error types.

use thiserror::Error;

/// Top-level error type shared by every Storyflow crate.
///
/// Diagnostic findings (dangling references, orphaned nodes) are not errors;
/// they are reported as data and only surface here as `ValidationFailed` when
/// they block a commit.
#[derive(Debug, Error)]
pub enum StoryError {
    /// A mutation would break a structural invariant of the graph, such as
    /// deleting the start node or reusing a node id.
    #[error("structural error: {0}")]
    Structural(String),

    /// A commit was refused because the draft has blocking diagnostics.
    #[error("validation failed for graph {graph_id}: {} blocking issue(s)", .issues.len())]
    ValidationFailed {
        /// The graph whose draft failed validation.
        graph_id: String,
        /// Human-readable description of each blocking issue.
        issues: Vec<String>,
    },

    /// The persistence collaborator has no graph with this id.
    #[error("graph not found: {0}")]
    GraphNotFound(String),

    /// Fetching a graph from the persistence collaborator failed.
    #[error("failed to resolve graph {graph_id}: {message}")]
    Resolution {
        /// The graph being resolved.
        graph_id: String,
        /// The underlying failure.
        message: String,
    },

    /// A handler is already registered for this event type.
    #[error("a handler is already registered for event type {0}")]
    HandlerConflict(String),

    /// An event handler failed while processing a dispatched event.
    #[error("event handler failed: {0}")]
    Handler(String),

    /// An operation needed an open draft but no graph is being edited.
    #[error("no graph is open for editing")]
    NoActiveGraph,

    /// Caller-supplied input was rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
