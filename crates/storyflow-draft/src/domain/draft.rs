//! Two-buffer draft manager with a delta log and a validation-gated commit.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use storyflow_core::clock::Clock;
use storyflow_core::error::StoryError;
use storyflow_graph::domain::events::{ChangeReason, GraphChanged};
use storyflow_graph::{EditOperation, GraphDocument, ValidationReport, WorkspaceEvent, diagnose};
use tracing::debug;

use super::delta::Delta;

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitOutcome {
    pub graph_id: String,
    /// SHA-256 of the committed document's JSON encoding.
    pub revision: String,
    pub applied_deltas: usize,
    pub committed_at: DateTime<Utc>,
}

/// Holds the committed and draft versions of one graph.
#[derive(Debug, Clone)]
pub struct DraftManager {
    graph_id: String,
    committed: GraphDocument,
    draft: GraphDocument,
    deltas: Vec<Delta>,
    validation: Option<ValidationReport>,
    has_uncommitted_changes: bool,
    last_committed_at: Option<DateTime<Utc>>,
    last_sequence: u64,
    /// Events pending publication.
    pending_events: Vec<WorkspaceEvent>,
}

fn revision_hash(graph: &GraphDocument) -> Result<String, StoryError> {
    let bytes = serde_json::to_vec(graph)
        .map_err(|e| StoryError::Infrastructure(format!("failed to encode graph: {e}")))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

impl DraftManager {
    /// Starts editing `graph` with identical committed and draft buffers.
    #[must_use]
    pub fn new(graph: GraphDocument) -> Self {
        let validation = Some(diagnose(&graph));
        Self {
            graph_id: graph.id.clone(),
            committed: graph.clone(),
            draft: graph,
            deltas: Vec::new(),
            validation,
            has_uncommitted_changes: false,
            last_committed_at: None,
            last_sequence: 0,
            pending_events: Vec::new(),
        }
    }

    #[must_use]
    pub fn graph_id(&self) -> &str {
        &self.graph_id
    }

    #[must_use]
    pub fn draft_graph(&self) -> &GraphDocument {
        &self.draft
    }

    #[must_use]
    pub fn committed_graph(&self) -> &GraphDocument {
        &self.committed
    }

    /// Edits applied since the last commit, oldest first.
    #[must_use]
    pub fn deltas(&self) -> &[Delta] {
        &self.deltas
    }

    /// The last computed diagnostics of the draft.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationReport> {
        self.validation.as_ref()
    }

    #[must_use]
    pub fn has_uncommitted_changes(&self) -> bool {
        self.has_uncommitted_changes
    }

    #[must_use]
    pub fn last_committed_at(&self) -> Option<DateTime<Utc>> {
        self.last_committed_at
    }

    /// Runs `operation` against the draft and logs it as a delta.
    ///
    /// # Errors
    ///
    /// Returns the operation's `StoryError::Structural`; the draft is left
    /// untouched.
    pub fn apply(
        &mut self,
        operation: EditOperation,
        clock: &dyn Clock,
    ) -> Result<&Delta, StoryError> {
        let after = operation.apply(&self.draft)?;
        let delta = Delta::capture(operation, &self.draft, &after, clock.now());
        Ok(self.apply_delta(delta))
    }

    /// Replays `delta` onto the draft, appends it to the log with the next
    /// sequence number and re-runs diagnostics.
    pub fn apply_delta(&mut self, mut delta: Delta) -> &Delta {
        self.last_sequence += 1;
        delta.sequence = self.last_sequence;
        delta.diff.apply_to(&mut self.draft);
        self.validation = Some(diagnose(&self.draft));
        self.has_uncommitted_changes = true;
        debug!(
            graph_id = %self.graph_id,
            sequence = delta.sequence,
            operation = delta.operation.name(),
            "delta applied"
        );

        let index = self.deltas.len();
        self.deltas.push(delta);
        &self.deltas[index]
    }

    /// Promotes the draft to committed.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::ValidationFailed` when diagnostics report blocking
    /// issues; nothing changes. Returns `StoryError::Infrastructure` if the
    /// draft cannot be encoded for hashing.
    pub fn commit_draft(&mut self, clock: &dyn Clock) -> Result<CommitOutcome, StoryError> {
        let report = match self.validation.take() {
            Some(report) => report,
            None => diagnose(&self.draft),
        };
        let blocking = report.blocking_messages();
        self.validation = Some(report);
        if !blocking.is_empty() {
            return Err(StoryError::ValidationFailed {
                graph_id: self.graph_id.clone(),
                issues: blocking,
            });
        }

        let revision = revision_hash(&self.draft)?;
        let applied_deltas = self.deltas.len();
        let now = clock.now();

        self.committed = self.draft.clone();
        self.deltas.clear();
        self.has_uncommitted_changes = false;
        self.last_committed_at = Some(now);

        self.pending_events
            .push(WorkspaceEvent::GraphChanged(GraphChanged {
                graph_id: self.graph_id.clone(),
                kind: self.committed.kind,
                reason: ChangeReason::Committed,
                revision: Some(revision.clone()),
                applied_deltas,
            }));

        Ok(CommitOutcome {
            graph_id: self.graph_id.clone(),
            revision,
            applied_deltas,
            committed_at: now,
        })
    }

    /// Throws the draft away, restoring it from the committed buffer.
    /// Diagnostics are cleared until the next edit.
    pub fn discard_draft(&mut self) {
        self.draft = self.committed.clone();
        self.deltas.clear();
        self.has_uncommitted_changes = false;
        self.validation = None;
    }

    /// Replaces both buffers with `graph`, e.g. after opening another graph.
    pub fn reset_draft(&mut self, graph: GraphDocument) {
        self.graph_id.clone_from(&graph.id);
        self.validation = Some(diagnose(&graph));
        self.committed = graph.clone();
        self.draft = graph;
        self.deltas.clear();
        self.has_uncommitted_changes = false;
        self.last_committed_at = None;
    }

    /// Returns events queued since the last `clear_pending_events`.
    #[must_use]
    pub fn pending_events(&self) -> &[WorkspaceEvent] {
        &self.pending_events
    }

    pub fn clear_pending_events(&mut self) {
        self.pending_events.clear();
    }

    /// Drains the queued events.
    pub fn take_pending_events(&mut self) -> Vec<WorkspaceEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
