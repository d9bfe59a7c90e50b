//! Connection editor: pure functions that mutate a graph document while
//! keeping the flow layer and the semantic pointer layer consistent.
//!
//! Every function takes the current document by reference and returns the
//! next one. Malformed requests against well-formed graphs (unknown ids,
//! out-of-range slots) are no-ops; only invariant-breaking requests fail.

use serde::{Deserialize, Serialize};
use storyflow_core::error::StoryError;

use super::document::{
    BlockType, CharacterData, Choice, ConditionalBlock, ConditionalData, FlowEdge, FlowNode,
    GraphDocument, NodeData, NodeType, PlayerData, Position,
};
use super::handle::Handle;

const PLACEHOLDER_SPEAKER: &str = "Speaker";
const PLACEHOLDER_CONTENT: &str = "New line of dialogue";
const PLACEHOLDER_CHOICE: &str = "New choice";

/// A request to connect two nodes, as produced by the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl Connection {
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        source_handle: Option<&str>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: source_handle.map(str::to_owned),
            target_handle: None,
        }
    }
}

fn unique_child_id(node_id: &str, label: &str, taken: &[&str]) -> String {
    let mut n = taken.len() + 1;
    loop {
        let candidate = format!("{node_id}_{label}_{n}");
        if !taken.contains(&candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

/// Creates a node with type-specific defaults.
///
/// PLAYER nodes get one seeded choice, CONDITIONAL nodes one seeded `IF`
/// block, CHARACTER nodes a placeholder line; everything else starts empty.
#[must_use]
pub fn create_node(node_type: NodeType, id: &str, x: f64, y: f64) -> FlowNode {
    let data = match node_type {
        NodeType::Player => NodeData::Player(PlayerData {
            choices: vec![Choice {
                id: unique_child_id(id, "choice", &[]),
                text: PLACEHOLDER_CHOICE.to_owned(),
                ..Choice::default()
            }],
        }),
        NodeType::Conditional => NodeData::Conditional(ConditionalData {
            conditional_blocks: vec![ConditionalBlock {
                id: unique_child_id(id, "block", &[]),
                block_type: BlockType::If,
                condition: Some(String::new()),
                ..ConditionalBlock::default()
            }],
        }),
        NodeType::Character => NodeData::Character(CharacterData {
            speaker: PLACEHOLDER_SPEAKER.to_owned(),
            content: PLACEHOLDER_CONTENT.to_owned(),
            ..CharacterData::default()
        }),
        other => NodeData::empty(other),
    };
    FlowNode {
        id: id.to_owned(),
        position: Position::new(x, y),
        data,
    }
}

/// Builds the deterministic id of the edge leaving `source` through
/// `source_handle` towards `target`.
#[must_use]
pub fn build_edge_id(source: &str, target: &str, source_handle: Option<&str>) -> String {
    match source_handle {
        Some(handle) if !handle.is_empty() => format!("e_{source}_{handle}_{target}"),
        _ => format!("e_{source}_{target}"),
    }
}

/// Appends a freshly created node.
///
/// # Errors
///
/// Returns `StoryError::Structural` if a node with `id` already exists.
pub fn add_node(
    graph: &GraphDocument,
    node_type: NodeType,
    id: &str,
    position: Position,
) -> Result<GraphDocument, StoryError> {
    if graph.contains_node(id) {
        return Err(StoryError::Structural(format!(
            "node id {id} already exists in graph {}",
            graph.id
        )));
    }
    let mut next = graph.clone();
    next.flow
        .nodes
        .push(create_node(node_type, id, position.x, position.y));
    Ok(next)
}

/// Deletes a node, every edge touching it, and every pointer to it.
///
/// # Errors
///
/// Returns `StoryError::Structural` if `node_id` is the start node.
pub fn delete_node(graph: &GraphDocument, node_id: &str) -> Result<GraphDocument, StoryError> {
    if node_id == graph.start_node_id {
        return Err(StoryError::Structural(format!(
            "cannot delete start node {node_id} of graph {}",
            graph.id
        )));
    }
    let mut next = graph.clone();
    next.flow.nodes.retain(|n| n.id != node_id);
    next.flow
        .edges
        .retain(|e| e.source != node_id && e.target != node_id);
    for node in &mut next.flow.nodes {
        node.data.scrub_target(node_id);
    }
    next.end_node_ids.retain(|end| end.node_id != node_id);
    Ok(next)
}

/// Moves a node on the canvas.
#[must_use]
pub fn move_node(graph: &GraphDocument, node_id: &str, position: Position) -> GraphDocument {
    let mut next = graph.clone();
    if let Some(node) = next.node_mut(node_id) {
        node.position = position;
    }
    next
}

/// Connects two nodes: upserts the deterministic edge and writes the matching
/// semantic pointer on the source node.
///
/// A slot holds one pointer, so any other semantic edge leaving the same
/// (source, handle) slot is replaced. The whole connection is a no-op when
/// either endpoint is missing or the source node has no such slot.
#[must_use]
pub fn apply_connection(graph: &GraphDocument, connection: &Connection) -> GraphDocument {
    let mut next = graph.clone();
    if !next.contains_node(&connection.target) {
        return next;
    }
    let handle = Handle::parse(connection.source_handle.as_deref());
    let kind = handle.kind();
    let edge_id = build_edge_id(
        &connection.source,
        &connection.target,
        connection.source_handle.as_deref(),
    );

    let Some(source) = next.node_mut(&connection.source) else {
        return next;
    };
    if kind.is_semantic() {
        if !source
            .data
            .set_slot(&handle, Some(connection.target.clone()))
        {
            return next;
        }
        next.flow.edges.retain(|e| {
            e.id == edge_id || e.source != connection.source || e.handle() != handle
        });
    }

    let edge = FlowEdge {
        id: edge_id,
        source: connection.source.clone(),
        target: connection.target.clone(),
        source_handle: connection.source_handle.clone(),
        target_handle: connection.target_handle.clone(),
        edge_type: kind.visual_type().to_owned(),
    };
    match next.flow.edges.iter_mut().find(|e| e.id == edge.id) {
        Some(existing) => *existing = edge,
        None => next.flow.edges.push(edge),
    }
    next
}

/// Removes an edge and, if it still mirrors a pointer, clears that pointer.
///
/// The pointer is left alone when it was repointed elsewhere after the edge
/// was drawn.
#[must_use]
pub fn remove_edge_and_semantic_link(graph: &GraphDocument, edge_id: &str) -> GraphDocument {
    let mut next = graph.clone();
    let Some(index) = next.flow.edges.iter().position(|e| e.id == edge_id) else {
        return next;
    };
    let edge = next.flow.edges.remove(index);
    let handle = edge.handle();
    if handle.kind().is_semantic() {
        if let Some(source) = next.node_mut(&edge.source) {
            let still_linked =
                source.data.slot_target(&handle).flatten() == Some(edge.target.as_str());
            if still_linked {
                source.data.set_slot(&handle, None);
            }
        }
    }
    next
}

/// Splices a new node into an existing edge.
///
/// The source keeps its original handle, so the new node lands in the slot
/// the old target occupied; the new node then continues to the old target
/// through its primary handle.
///
/// # Errors
///
/// Returns `StoryError::Structural` if `new_id` is already taken.
pub fn insert_node_between_edge(
    graph: &GraphDocument,
    edge_id: &str,
    new_type: NodeType,
    new_id: &str,
    x: f64,
    y: f64,
) -> Result<GraphDocument, StoryError> {
    let Some(edge) = graph.edge(edge_id).cloned() else {
        return Ok(graph.clone());
    };
    if graph.contains_node(new_id) {
        return Err(StoryError::Structural(format!(
            "node id {new_id} already exists in graph {}",
            graph.id
        )));
    }

    let mut next = remove_edge_and_semantic_link(graph, edge_id);
    next.flow.nodes.push(create_node(new_type, new_id, x, y));
    let next = apply_connection(
        &next,
        &Connection {
            source: edge.source,
            target: new_id.to_owned(),
            source_handle: edge.source_handle,
            target_handle: None,
        },
    );
    let next = apply_connection(
        &next,
        &Connection {
            source: new_id.to_owned(),
            target: edge.target,
            source_handle: Some(new_type.primary_handle().to_string()),
            target_handle: edge.target_handle,
        },
    );
    Ok(next)
}

/// Appends a choice to a PLAYER node.
#[must_use]
pub fn add_choice(graph: &GraphDocument, node_id: &str, text: &str) -> GraphDocument {
    let mut next = graph.clone();
    if let Some(FlowNode {
        data: NodeData::Player(player),
        ..
    }) = next.node_mut(node_id)
    {
        let taken: Vec<&str> = player.choices.iter().map(|c| c.id.as_str()).collect();
        let id = unique_child_id(node_id, "choice", &taken);
        player.choices.push(Choice {
            id,
            text: text.to_owned(),
            ..Choice::default()
        });
    }
    next
}

/// Removes a choice from a PLAYER node and re-keys the node's edges, since
/// later choices shift down one index.
#[must_use]
pub fn remove_choice(graph: &GraphDocument, node_id: &str, index: usize) -> GraphDocument {
    let mut next = graph.clone();
    let removed = match next.node_mut(node_id) {
        Some(FlowNode {
            data: NodeData::Player(player),
            ..
        }) if index < player.choices.len() => {
            player.choices.remove(index);
            true
        }
        _ => false,
    };
    if removed {
        reconcile_node(&mut next, node_id);
    }
    next
}

/// Appends a block to a CONDITIONAL node.
#[must_use]
pub fn add_conditional_block(
    graph: &GraphDocument,
    node_id: &str,
    block_type: BlockType,
    condition: Option<&str>,
) -> GraphDocument {
    let mut next = graph.clone();
    if let Some(FlowNode {
        data: NodeData::Conditional(conditional),
        ..
    }) = next.node_mut(node_id)
    {
        let taken: Vec<&str> = conditional
            .conditional_blocks
            .iter()
            .map(|b| b.id.as_str())
            .collect();
        let id = unique_child_id(node_id, "block", &taken);
        conditional.conditional_blocks.push(ConditionalBlock {
            id,
            block_type,
            condition: condition.map(str::to_owned),
            ..ConditionalBlock::default()
        });
    }
    next
}

/// Removes a block from a CONDITIONAL node and re-keys the node's edges.
#[must_use]
pub fn remove_conditional_block(
    graph: &GraphDocument,
    node_id: &str,
    index: usize,
) -> GraphDocument {
    let mut next = graph.clone();
    let removed = match next.node_mut(node_id) {
        Some(FlowNode {
            data: NodeData::Conditional(conditional),
            ..
        }) if index < conditional.conditional_blocks.len() => {
            conditional.conditional_blocks.remove(index);
            true
        }
        _ => false,
    };
    if removed {
        reconcile_node(&mut next, node_id);
    }
    next
}

/// Replaces the speaker and line of a CHARACTER node.
#[must_use]
pub fn set_character_line(
    graph: &GraphDocument,
    node_id: &str,
    speaker: &str,
    content: &str,
) -> GraphDocument {
    let mut next = graph.clone();
    if let Some(FlowNode {
        data: NodeData::Character(character),
        ..
    }) = next.node_mut(node_id)
    {
        speaker.clone_into(&mut character.speaker);
        content.clone_into(&mut character.content);
    }
    next
}

/// Replaces the text of one choice.
#[must_use]
pub fn set_choice_text(
    graph: &GraphDocument,
    node_id: &str,
    index: usize,
    text: &str,
) -> GraphDocument {
    let mut next = graph.clone();
    if let Some(FlowNode {
        data: NodeData::Player(player),
        ..
    }) = next.node_mut(node_id)
    {
        if let Some(choice) = player.choices.get_mut(index) {
            text.clone_into(&mut choice.text);
        }
    }
    next
}

/// Replaces the condition of one conditional block.
#[must_use]
pub fn set_block_condition(
    graph: &GraphDocument,
    node_id: &str,
    index: usize,
    condition: Option<&str>,
) -> GraphDocument {
    let mut next = graph.clone();
    if let Some(FlowNode {
        data: NodeData::Conditional(conditional),
        ..
    }) = next.node_mut(node_id)
    {
        if let Some(block) = conditional.conditional_blocks.get_mut(index) {
            block.condition = condition.map(str::to_owned);
        }
    }
    next
}

/// Re-derives the semantic edges leaving `node_id` from its pointers.
///
/// Edges that still match a (handle, target) pointer are kept untouched;
/// stale semantic edges are dropped and missing ones appended. Pointers to
/// absent nodes get no edge.
pub fn reconcile_node(graph: &mut GraphDocument, node_id: &str) {
    let node_ids = graph.node_ids();
    let Some(node) = graph.node(node_id) else {
        return;
    };
    let desired: Vec<(Handle, String)> = node
        .data
        .semantic_links()
        .into_iter()
        .filter(|(_, target)| node_ids.contains(target))
        .map(|(handle, target)| (handle, target.to_owned()))
        .collect();
    drop(node_ids);

    let mut satisfied = vec![false; desired.len()];
    graph.flow.edges.retain(|e| {
        if e.source != node_id || !e.kind().is_semantic() {
            return true;
        }
        let handle = e.handle();
        let matched = desired
            .iter()
            .enumerate()
            .position(|(i, (h, t))| !satisfied[i] && *h == handle && *t == e.target);
        match matched {
            Some(i) => {
                satisfied[i] = true;
                true
            }
            None => false,
        }
    });

    for ((handle, target), done) in desired.into_iter().zip(satisfied) {
        if done {
            continue;
        }
        let source_handle = handle.to_string();
        let id = build_edge_id(node_id, &target, Some(&source_handle));
        // Edge ids are unique; a cosmetic edge squatting on this id gives way.
        graph.flow.edges.retain(|e| e.id != id);
        graph.flow.edges.push(FlowEdge {
            id,
            source: node_id.to_owned(),
            target,
            source_handle: Some(source_handle),
            target_handle: None,
            edge_type: handle.kind().visual_type().to_owned(),
        });
    }
}

/// Brings both layers of a programmatically built or imported document into
/// agreement: edges with missing endpoints are dropped and every node's
/// semantic edges are re-derived from its pointers.
#[must_use]
pub fn reconcile(graph: &GraphDocument) -> GraphDocument {
    let mut next = graph.clone();
    let node_ids: Vec<String> = next.flow.nodes.iter().map(|n| n.id.clone()).collect();
    next.flow.edges.retain(|e| {
        node_ids.iter().any(|id| *id == e.source) && node_ids.iter().any(|id| *id == e.target)
    });
    for node_id in &node_ids {
        reconcile_node(&mut next, node_id);
    }
    next
}
