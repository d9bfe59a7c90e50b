//! Workspace events published to collaborators.

use serde::{Deserialize, Serialize};
use storyflow_core::event::DomainEvent;

use super::document::GraphKind;

pub const GRAPH_CHANGED_EVENT_TYPE: &str = "graph.changed";
pub const GRAPH_OPEN_REQUESTED_EVENT_TYPE: &str = "graph.openRequested";
pub const TAB_CHANGED_EVENT_TYPE: &str = "ui.tabChanged";
pub const NARRATIVE_SELECTED_EVENT_TYPE: &str = "narrative.select";

/// Every event type the workspace knows, in registration order.
pub const ALL_EVENT_TYPES: [&str; 4] = [
    GRAPH_CHANGED_EVENT_TYPE,
    GRAPH_OPEN_REQUESTED_EVENT_TYPE,
    TAB_CHANGED_EVENT_TYPE,
    NARRATIVE_SELECTED_EVENT_TYPE,
];

/// Why a graph changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeReason {
    Created,
    Committed,
}

/// Emitted when a graph is created or a draft is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphChanged {
    pub graph_id: String,
    pub kind: GraphKind,
    pub reason: ChangeReason,
    /// SHA-256 of the committed document; absent for creations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    /// Number of deltas folded into the commit.
    #[serde(default)]
    pub applied_deltas: usize,
}

/// Asks the workspace to open a graph (breadcrumb jumps, detour links).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphOpenRequested {
    pub graph_id: String,
    pub kind: GraphKind,
    #[serde(default)]
    pub title: String,
}

/// The author switched editor tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabChanged {
    pub tab: String,
}

/// A narrative (and optionally one of its nodes) was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeSelected {
    pub graph_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

/// Event payload variants, serialized as `{type, payload}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum WorkspaceEvent {
    #[serde(rename = "graph.changed")]
    GraphChanged(GraphChanged),
    #[serde(rename = "graph.openRequested")]
    GraphOpenRequested(GraphOpenRequested),
    #[serde(rename = "ui.tabChanged")]
    TabChanged(TabChanged),
    #[serde(rename = "narrative.select")]
    NarrativeSelected(NarrativeSelected),
}

impl DomainEvent for WorkspaceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::GraphChanged(_) => GRAPH_CHANGED_EVENT_TYPE,
            Self::GraphOpenRequested(_) => GRAPH_OPEN_REQUESTED_EVENT_TYPE,
            Self::TabChanged(_) => TAB_CHANGED_EVENT_TYPE,
            Self::NarrativeSelected(_) => NARRATIVE_SELECTED_EVENT_TYPE,
        }
    }
}
