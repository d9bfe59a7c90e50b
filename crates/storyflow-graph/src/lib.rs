//! Storyflow: narrative graph domain model.
//!
//! A graph document carries two layers that must stay in lockstep: the visual
//! flow layer (positioned nodes and drawn edges) and the semantic layer (the
//! next-node pointers stored on node data). The connection editor is the only
//! code that mutates both; the hierarchy module derives a cycle-safe spanning
//! tree and the diagnostics that gate commits.

pub mod domain;

pub use domain::diagnostics::{Severity, ValidationIssue, ValidationReport, diagnose};
pub use domain::document::{
    BlockType, CharacterData, Choice, ConditionalBlock, ConditionalData, EndNode, Flow, FlowEdge,
    FlowNode, GraphDocument, GraphKind, NodeData, NodeType, PlayerData, Position, StructuralData,
    Viewport,
};
pub use domain::editor::Connection;
pub use domain::events::WorkspaceEvent;
pub use domain::handle::{EdgeKind, Handle};
pub use domain::hierarchy::{Hierarchy, TreeIssue, TreeNode, TreeValidation};
pub use domain::operations::EditOperation;
pub use domain::repository::{GraphPatch, GraphRepository, GraphSummary, NewGraph};
