//! Serializable edit operations.
//!
//! Every canvas gesture is expressed as one [`EditOperation`]; applying it
//! dispatches to the matching connection editor function.

use serde::{Deserialize, Serialize};
use storyflow_core::error::StoryError;

use super::document::{BlockType, GraphDocument, NodeType, Position};
use super::editor::{self, Connection};

/// A single author edit against a graph document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditOperation {
    CreateNode {
        node_type: NodeType,
        node_id: String,
        #[serde(default)]
        position: Position,
    },
    DeleteNode {
        node_id: String,
    },
    Connect(Connection),
    Disconnect {
        edge_id: String,
    },
    InsertBetween {
        edge_id: String,
        node_type: NodeType,
        node_id: String,
        #[serde(default)]
        position: Position,
    },
    MoveNode {
        node_id: String,
        position: Position,
    },
    AddChoice {
        node_id: String,
        #[serde(default)]
        text: String,
    },
    RemoveChoice {
        node_id: String,
        index: usize,
    },
    AddConditionalBlock {
        node_id: String,
        block_type: BlockType,
        #[serde(default)]
        condition: Option<String>,
    },
    RemoveConditionalBlock {
        node_id: String,
        index: usize,
    },
    SetCharacterLine {
        node_id: String,
        speaker: String,
        content: String,
    },
    SetChoiceText {
        node_id: String,
        index: usize,
        text: String,
    },
    SetBlockCondition {
        node_id: String,
        index: usize,
        #[serde(default)]
        condition: Option<String>,
    },
}

impl EditOperation {
    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateNode { .. } => "createNode",
            Self::DeleteNode { .. } => "deleteNode",
            Self::Connect(_) => "connect",
            Self::Disconnect { .. } => "disconnect",
            Self::InsertBetween { .. } => "insertBetween",
            Self::MoveNode { .. } => "moveNode",
            Self::AddChoice { .. } => "addChoice",
            Self::RemoveChoice { .. } => "removeChoice",
            Self::AddConditionalBlock { .. } => "addConditionalBlock",
            Self::RemoveConditionalBlock { .. } => "removeConditionalBlock",
            Self::SetCharacterLine { .. } => "setCharacterLine",
            Self::SetChoiceText { .. } => "setChoiceText",
            Self::SetBlockCondition { .. } => "setBlockCondition",
        }
    }

    /// Applies this operation, producing the next document.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Structural` when the edit would break a graph
    /// invariant (deleting the start node, reusing a node id).
    pub fn apply(&self, graph: &GraphDocument) -> Result<GraphDocument, StoryError> {
        match self {
            Self::CreateNode {
                node_type,
                node_id,
                position,
            } => editor::add_node(graph, *node_type, node_id, *position),
            Self::DeleteNode { node_id } => editor::delete_node(graph, node_id),
            Self::Connect(connection) => Ok(editor::apply_connection(graph, connection)),
            Self::Disconnect { edge_id } => {
                Ok(editor::remove_edge_and_semantic_link(graph, edge_id))
            }
            Self::InsertBetween {
                edge_id,
                node_type,
                node_id,
                position,
            } => editor::insert_node_between_edge(
                graph, edge_id, *node_type, node_id, position.x, position.y,
            ),
            Self::MoveNode { node_id, position } => {
                Ok(editor::move_node(graph, node_id, *position))
            }
            Self::AddChoice { node_id, text } => Ok(editor::add_choice(graph, node_id, text)),
            Self::RemoveChoice { node_id, index } => {
                Ok(editor::remove_choice(graph, node_id, *index))
            }
            Self::AddConditionalBlock {
                node_id,
                block_type,
                condition,
            } => Ok(editor::add_conditional_block(
                graph,
                node_id,
                *block_type,
                condition.as_deref(),
            )),
            Self::RemoveConditionalBlock { node_id, index } => {
                Ok(editor::remove_conditional_block(graph, node_id, *index))
            }
            Self::SetCharacterLine {
                node_id,
                speaker,
                content,
            } => Ok(editor::set_character_line(graph, node_id, speaker, content)),
            Self::SetChoiceText {
                node_id,
                index,
                text,
            } => Ok(editor::set_choice_text(graph, node_id, *index, text)),
            Self::SetBlockCondition {
                node_id,
                index,
                condition,
            } => Ok(editor::set_block_condition(
                graph,
                node_id,
                *index,
                condition.as_deref(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::GraphKind;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn graph() -> GraphDocument {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        GraphDocument::new("g1", "p1", GraphKind::Narrative, "Ops", now)
    }

    #[test]
    fn test_connect_deserializes_from_canvas_shape() {
        let raw = json!({
            "op": "connect",
            "source": "start",
            "target": "n1",
            "sourceHandle": "next"
        });

        let op: EditOperation = serde_json::from_value(raw).unwrap();

        assert_eq!(
            op,
            EditOperation::Connect(Connection::new("start", "n1", Some("next")))
        );
    }

    #[test]
    fn test_create_node_uses_camel_case_fields() {
        let raw = json!({
            "op": "createNode",
            "nodeType": "PAGE",
            "nodeId": "p1",
            "position": { "x": 3.0, "y": 4.0 }
        });

        let op: EditOperation = serde_json::from_value(raw).unwrap();

        assert_eq!(op.name(), "createNode");
        let next = op.apply(&graph()).unwrap();
        assert_eq!(next.node("p1").unwrap().position, Position::new(3.0, 4.0));
    }

    #[test]
    fn test_apply_sequence_builds_connected_graph() {
        let ops = vec![
            EditOperation::CreateNode {
                node_type: NodeType::Page,
                node_id: "a".to_owned(),
                position: Position::default(),
            },
            EditOperation::Connect(Connection::new("start", "a", None)),
            EditOperation::Disconnect {
                edge_id: "e_start_a".to_owned(),
            },
        ];

        let mut current = graph();
        for op in &ops {
            current = op.apply(&current).unwrap();
        }

        assert!(current.flow.edges.is_empty());
        assert_eq!(current.start_node().unwrap().data.default_next(), None);
    }

    #[test]
    fn test_delete_start_through_operation_fails() {
        let op = EditOperation::DeleteNode {
            node_id: "start".to_owned(),
        };

        assert!(matches!(op.apply(&graph()), Err(StoryError::Structural(_))));
    }
}
