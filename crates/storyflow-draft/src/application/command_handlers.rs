//! Command handlers for the draft workflow.
//!
//! Handlers that touch persistence take the workspace behind a
//! `std::sync::Mutex` and never hold the guard across an `.await`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use storyflow_core::clock::Clock;
use storyflow_core::error::StoryError;
use storyflow_event_bus::EventBus;
use storyflow_graph::domain::events::{ChangeReason, GraphChanged, GraphOpenRequested};
use storyflow_graph::{
    GraphDocument, GraphPatch, GraphRepository, NewGraph, ValidationReport, WorkspaceEvent,
};
use storyflow_navigation::Breadcrumb;
use tracing::{info, instrument, warn};

use crate::application::workspace::Workspace;
use crate::domain::commands::{
    ApplyEdit, CommitDraft, CreateGraph, DiscardDraft, NavigateBreadcrumb, OpenGraph,
};
use crate::domain::delta::GraphDiff;
use crate::domain::draft::CommitOutcome;

/// Result of applying one edit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
    pub sequence: u64,
    pub diff: GraphDiff,
    pub validation: Option<ValidationReport>,
    pub has_uncommitted_changes: bool,
}

/// Locks the workspace, recovering from a poisoned lock.
pub fn lock(workspace: &Mutex<Workspace>) -> MutexGuard<'_, Workspace> {
    workspace.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns a graph from the cache or fetches it.
///
/// The lock is released while the repository is awaited. A concurrent caller
/// for the same id is not joined to the in-flight fetch and fetches again.
///
/// # Errors
///
/// Returns `StoryError::GraphNotFound` for unknown ids and
/// `StoryError::Resolution` for any other fetch failure; both are also
/// recorded as the graph's `error` status.
#[instrument(skip(workspace, repo))]
pub async fn resolve_graph(
    graph_id: &str,
    workspace: &Mutex<Workspace>,
    repo: &dyn GraphRepository,
) -> Result<GraphDocument, StoryError> {
    {
        let mut ws = lock(workspace);
        if let Some(graph) = ws.cache.ready(graph_id) {
            return Ok(graph.clone());
        }
        ws.cache.mark_loading(graph_id);
    }

    let fetched = repo.get_graph(graph_id).await;

    let mut ws = lock(workspace);
    match fetched {
        Ok(graph) => {
            ws.cache.mark_ready(graph.clone());
            Ok(graph)
        }
        Err(StoryError::GraphNotFound(id)) => {
            warn!(graph_id, "graph not found");
            ws.cache.mark_error(graph_id, format!("graph not found: {id}"));
            Err(StoryError::GraphNotFound(id))
        }
        Err(err) => {
            let message = err.to_string();
            warn!(graph_id, error = %message, "graph resolution failed");
            ws.cache.mark_error(graph_id, message.clone());
            Err(StoryError::Resolution {
                graph_id: graph_id.to_owned(),
                message,
            })
        }
    }
}

/// Handles the `OpenGraph` command: resolves the graph, makes it the edited
/// graph and records a breadcrumb.
///
/// # Errors
///
/// Returns the resolution error.
pub async fn handle_open_graph(
    command: &OpenGraph,
    workspace: &Mutex<Workspace>,
    repo: &dyn GraphRepository,
) -> Result<GraphDocument, StoryError> {
    info!(
        correlation_id = %command.correlation_id,
        graph_id = %command.graph_id,
        "opening graph"
    );
    let graph = resolve_graph(&command.graph_id, workspace, repo).await?;

    let mut ws = lock(workspace);
    ws.open(graph.clone());
    ws.breadcrumbs.push(Breadcrumb::new(
        graph.id.clone(),
        graph.title.clone(),
        graph.kind,
    ));
    Ok(graph)
}

/// Handles the `CreateGraph` command: creates the graph through the
/// repository, caches it and announces it.
///
/// The repository assigns the graph id.
///
/// # Errors
///
/// Returns the repository error or a handler error from the bus.
pub async fn handle_create_graph(
    command: &CreateGraph,
    workspace: &Mutex<Workspace>,
    repo: &dyn GraphRepository,
    bus: &EventBus<WorkspaceEvent>,
) -> Result<GraphDocument, StoryError> {
    info!(
        correlation_id = %command.correlation_id,
        project_id = %command.project_id,
        kind = %command.kind,
        "creating graph"
    );
    let graph = repo
        .create_graph(NewGraph {
            project_id: command.project_id.clone(),
            kind: command.kind,
            title: command.title.clone(),
        })
        .await?;

    lock(workspace).cache.mark_ready(graph.clone());

    bus.publish(WorkspaceEvent::GraphChanged(GraphChanged {
        graph_id: graph.id.clone(),
        kind: graph.kind,
        reason: ChangeReason::Created,
        revision: None,
        applied_deltas: 0,
    }))
    .await?;
    Ok(graph)
}

/// Handles the `ApplyEdit` command against the open draft.
///
/// # Errors
///
/// Returns `StoryError::NoActiveGraph` or the edit's structural error.
pub fn handle_apply_edit(
    command: &ApplyEdit,
    workspace: &mut Workspace,
    clock: &dyn Clock,
) -> Result<EditOutcome, StoryError> {
    info!(
        correlation_id = %command.correlation_id,
        operation = command.operation.name(),
        "applying edit"
    );
    let draft = workspace.draft_mut()?;
    let delta = draft.apply(command.operation.clone(), clock)?;
    let sequence = delta.sequence;
    let diff = delta.diff.clone();
    Ok(EditOutcome {
        sequence,
        diff,
        validation: draft.validation().cloned(),
        has_uncommitted_changes: draft.has_uncommitted_changes(),
    })
}

/// Handles the `CommitDraft` command: commits under the lock, persists the
/// committed document, then publishes the queued events.
///
/// # Errors
///
/// Returns `StoryError::ValidationFailed` when the draft has blocking
/// issues, the repository error when persisting fails (committing again
/// retries it), or a handler error from the bus.
pub async fn handle_commit_draft(
    command: &CommitDraft,
    workspace: &Mutex<Workspace>,
    repo: &dyn GraphRepository,
    bus: &EventBus<WorkspaceEvent>,
    clock: &dyn Clock,
) -> Result<CommitOutcome, StoryError> {
    info!(correlation_id = %command.correlation_id, "committing draft");
    let (outcome, committed, events) = {
        let mut ws = lock(workspace);
        let draft = ws.draft_mut()?;
        let outcome = draft.commit_draft(clock)?;
        let committed = draft.committed_graph().clone();
        let events = draft.take_pending_events();
        ws.cache.mark_ready(committed.clone());
        (outcome, committed, events)
    };

    repo.update_graph(&committed.id, GraphPatch::from_document(&committed))
        .await?;

    for event in events {
        bus.publish(event).await?;
    }
    Ok(outcome)
}

/// Handles the `DiscardDraft` command.
///
/// # Errors
///
/// Returns `StoryError::NoActiveGraph` when nothing is open.
pub fn handle_discard_draft(
    command: &DiscardDraft,
    workspace: &mut Workspace,
) -> Result<(), StoryError> {
    let draft = workspace.draft_mut()?;
    info!(
        correlation_id = %command.correlation_id,
        graph_id = %draft.graph_id(),
        deltas = draft.deltas().len(),
        "discarding draft"
    );
    draft.discard_draft();
    Ok(())
}

/// Handles the `NavigateBreadcrumb` command: reopens the target entry,
/// then truncates the scope's history to it and announces the jump. The
/// target is not pushed again.
///
/// History is left untouched when the target cannot be resolved.
///
/// # Errors
///
/// Returns `StoryError::InvalidInput` for an index outside the stack, the
/// resolution error, or a handler error from the bus.
pub async fn handle_navigate_breadcrumb(
    command: &NavigateBreadcrumb,
    workspace: &Mutex<Workspace>,
    repo: &dyn GraphRepository,
    bus: &EventBus<WorkspaceEvent>,
) -> Result<GraphDocument, StoryError> {
    info!(
        correlation_id = %command.correlation_id,
        scope = %command.scope,
        index = command.index,
        "navigating breadcrumb"
    );
    let out_of_range = || {
        StoryError::InvalidInput(format!(
            "no breadcrumb at index {} in scope {}",
            command.index, command.scope
        ))
    };
    let target = lock(workspace)
        .breadcrumbs
        .breadcrumbs(command.scope)
        .get(command.index)
        .cloned()
        .ok_or_else(out_of_range)?;

    let graph = resolve_graph(&target.graph_id, workspace, repo).await?;

    let crumb = {
        let mut ws = lock(workspace);
        let crumb = ws
            .breadcrumbs
            .navigate_to(command.scope, command.index)
            .ok_or_else(out_of_range)?;
        ws.open(graph.clone());
        crumb
    };

    bus.publish(WorkspaceEvent::GraphOpenRequested(GraphOpenRequested {
        graph_id: crumb.graph_id,
        kind: crumb.scope,
        title: crumb.title,
    }))
    .await?;
    Ok(graph)
}
