//! Graph document model and its wire shape.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::editor;
use super::handle::{EdgeKind, Handle};

/// Id given to the start node of a freshly created document.
pub const START_NODE_ID: &str = "start";

/// The two kinds of graph an author edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GraphKind {
    /// A main narrative (acts, chapters, pages).
    Narrative,
    /// A reusable storylet entered through detours.
    Storylet,
}

impl GraphKind {
    /// Wire name of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Narrative => "NARRATIVE",
            Self::Storylet => "STORYLET",
        }
    }

    /// Node type seeded as the start node of a new document of this kind.
    #[must_use]
    pub fn start_node_type(self) -> NodeType {
        match self {
            Self::Narrative => NodeType::Act,
            Self::Storylet => NodeType::Storylet,
        }
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraphKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NARRATIVE" => Ok(Self::Narrative),
            "STORYLET" => Ok(Self::Storylet),
            other => Err(format!("unknown graph kind: {other}")),
        }
    }
}

/// Discriminant of [`NodeData`], serialized as the node's `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Act,
    Chapter,
    Page,
    Detour,
    Storylet,
    Jump,
    End,
    Character,
    Player,
    Conditional,
}

impl NodeType {
    /// The handle used when a node of this type is wired to a successor
    /// without a more specific slot.
    #[must_use]
    pub fn primary_handle(self) -> Handle {
        match self {
            Self::Player => Handle::Choice(0),
            Self::Conditional => Handle::Block(0),
            _ => Handle::Next,
        }
    }
}

/// Canvas position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Canvas viewport persisted with the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Data carried by structural nodes (ACT, CHAPTER, PAGE, DETOUR, STORYLET,
/// JUMP, END).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StructuralData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Storylet graph entered by DETOUR and STORYLET nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_graph_id: Option<String>,
    /// Node jumped to by JUMP nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_node_id: Option<String>,
    /// Exit key reported by END nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_next_node_id: Option<String>,
}

/// A spoken line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_id: Option<String>,
    pub speaker: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_next_node_id: Option<String>,
}

/// One option offered to the player.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Choice {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_node_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerData {
    pub choices: Vec<Choice>,
}

/// Branch keyword of a conditional block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlockType {
    #[default]
    If,
    ElseIf,
    Else,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConditionalBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_node_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConditionalData {
    pub conditional_blocks: Vec<ConditionalBlock>,
}

/// Node payload, one variant per [`NodeType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Act(StructuralData),
    Chapter(StructuralData),
    Page(StructuralData),
    Detour(StructuralData),
    Storylet(StructuralData),
    Jump(StructuralData),
    End(StructuralData),
    Character(CharacterData),
    Player(PlayerData),
    Conditional(ConditionalData),
}

fn clear_if_targets(pointer: &mut Option<String>, node_id: &str) -> bool {
    if pointer.as_deref() == Some(node_id) {
        *pointer = None;
        true
    } else {
        false
    }
}

impl NodeData {
    /// Empty payload for a node type; the editor layers seeded defaults on
    /// top of this.
    #[must_use]
    pub fn empty(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Act => Self::Act(StructuralData::default()),
            NodeType::Chapter => Self::Chapter(StructuralData::default()),
            NodeType::Page => Self::Page(StructuralData::default()),
            NodeType::Detour => Self::Detour(StructuralData::default()),
            NodeType::Storylet => Self::Storylet(StructuralData::default()),
            NodeType::Jump => Self::Jump(StructuralData::default()),
            NodeType::End => Self::End(StructuralData::default()),
            NodeType::Character => Self::Character(CharacterData::default()),
            NodeType::Player => Self::Player(PlayerData::default()),
            NodeType::Conditional => Self::Conditional(ConditionalData::default()),
        }
    }

    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Act(_) => NodeType::Act,
            Self::Chapter(_) => NodeType::Chapter,
            Self::Page(_) => NodeType::Page,
            Self::Detour(_) => NodeType::Detour,
            Self::Storylet(_) => NodeType::Storylet,
            Self::Jump(_) => NodeType::Jump,
            Self::End(_) => NodeType::End,
            Self::Character(_) => NodeType::Character,
            Self::Player(_) => NodeType::Player,
            Self::Conditional(_) => NodeType::Conditional,
        }
    }

    fn next_pointer(&self) -> Option<&Option<String>> {
        match self {
            Self::Act(s)
            | Self::Chapter(s)
            | Self::Page(s)
            | Self::Detour(s)
            | Self::Storylet(s)
            | Self::Jump(s)
            | Self::End(s) => Some(&s.default_next_node_id),
            Self::Character(c) => Some(&c.default_next_node_id),
            Self::Player(_) | Self::Conditional(_) => None,
        }
    }

    fn next_pointer_mut(&mut self) -> Option<&mut Option<String>> {
        match self {
            Self::Act(s)
            | Self::Chapter(s)
            | Self::Page(s)
            | Self::Detour(s)
            | Self::Storylet(s)
            | Self::Jump(s)
            | Self::End(s) => Some(&mut s.default_next_node_id),
            Self::Character(c) => Some(&mut c.default_next_node_id),
            Self::Player(_) | Self::Conditional(_) => None,
        }
    }

    fn pointer(&self, handle: &Handle) -> Option<&Option<String>> {
        match (handle, self) {
            (Handle::Next, _) => self.next_pointer(),
            (Handle::Choice(index), Self::Player(p)) => {
                p.choices.get(*index).map(|c| &c.next_node_id)
            }
            (Handle::Block(index), Self::Conditional(c)) => {
                c.conditional_blocks.get(*index).map(|b| &b.next_node_id)
            }
            _ => None,
        }
    }

    fn pointer_mut(&mut self, handle: &Handle) -> Option<&mut Option<String>> {
        match (handle, self) {
            (Handle::Next, data) => data.next_pointer_mut(),
            (Handle::Choice(index), Self::Player(p)) => {
                p.choices.get_mut(*index).map(|c| &mut c.next_node_id)
            }
            (Handle::Block(index), Self::Conditional(c)) => c
                .conditional_blocks
                .get_mut(*index)
                .map(|b| &mut b.next_node_id),
            _ => None,
        }
    }

    /// The default next pointer of single-next node types.
    #[must_use]
    pub fn default_next(&self) -> Option<&str> {
        self.next_pointer().and_then(Option::as_deref)
    }

    /// Reads the pointer behind `handle`.
    ///
    /// The outer `Option` is `None` when this node has no such slot; the inner
    /// one is the pointer itself.
    #[must_use]
    pub fn slot_target(&self, handle: &Handle) -> Option<Option<&str>> {
        self.pointer(handle).map(Option::as_deref)
    }

    /// Writes the pointer behind `handle`. Returns `false` (and changes
    /// nothing) when this node has no such slot.
    pub fn set_slot(&mut self, handle: &Handle, target: Option<String>) -> bool {
        match self.pointer_mut(handle) {
            Some(pointer) => {
                *pointer = target;
                true
            }
            None => false,
        }
    }

    /// Every populated semantic pointer, in slot order.
    #[must_use]
    pub fn semantic_links(&self) -> Vec<(Handle, &str)> {
        match self {
            Self::Act(s)
            | Self::Chapter(s)
            | Self::Page(s)
            | Self::Detour(s)
            | Self::Storylet(s)
            | Self::Jump(s)
            | Self::End(s) => s
                .default_next_node_id
                .as_deref()
                .map(|target| (Handle::Next, target))
                .into_iter()
                .collect(),
            Self::Character(c) => c
                .default_next_node_id
                .as_deref()
                .map(|target| (Handle::Next, target))
                .into_iter()
                .collect(),
            Self::Player(p) => p
                .choices
                .iter()
                .enumerate()
                .filter_map(|(i, c)| c.next_node_id.as_deref().map(|t| (Handle::Choice(i), t)))
                .collect(),
            Self::Conditional(c) => c
                .conditional_blocks
                .iter()
                .enumerate()
                .filter_map(|(i, b)| b.next_node_id.as_deref().map(|t| (Handle::Block(i), t)))
                .collect(),
        }
    }

    /// Child ids in hierarchy order.
    #[must_use]
    pub fn child_ids(&self) -> Vec<&str> {
        self.semantic_links()
            .into_iter()
            .map(|(_, target)| target)
            .collect()
    }

    /// Clears every pointer that targets `node_id`. Returns whether anything
    /// changed.
    pub fn scrub_target(&mut self, node_id: &str) -> bool {
        match self {
            Self::Act(s)
            | Self::Chapter(s)
            | Self::Page(s)
            | Self::Detour(s)
            | Self::Storylet(s)
            | Self::Jump(s)
            | Self::End(s) => clear_if_targets(&mut s.default_next_node_id, node_id),
            Self::Character(c) => clear_if_targets(&mut c.default_next_node_id, node_id),
            Self::Player(p) => p.choices.iter_mut().fold(false, |changed, choice| {
                clear_if_targets(&mut choice.next_node_id, node_id) | changed
            }),
            Self::Conditional(c) => c.conditional_blocks.iter_mut().fold(false, |changed, b| {
                clear_if_targets(&mut b.next_node_id, node_id) | changed
            }),
        }
    }

    /// Decodes the `data` object of a wire node.
    ///
    /// # Errors
    ///
    /// Returns the serde error if `data` does not match the payload of
    /// `node_type`.
    pub fn from_wire(
        node_type: NodeType,
        data: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        let data = if data.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            data
        };
        Ok(match node_type {
            NodeType::Act => Self::Act(serde_json::from_value(data)?),
            NodeType::Chapter => Self::Chapter(serde_json::from_value(data)?),
            NodeType::Page => Self::Page(serde_json::from_value(data)?),
            NodeType::Detour => Self::Detour(serde_json::from_value(data)?),
            NodeType::Storylet => Self::Storylet(serde_json::from_value(data)?),
            NodeType::Jump => Self::Jump(serde_json::from_value(data)?),
            NodeType::End => Self::End(serde_json::from_value(data)?),
            NodeType::Character => Self::Character(serde_json::from_value(data)?),
            NodeType::Player => Self::Player(serde_json::from_value(data)?),
            NodeType::Conditional => Self::Conditional(serde_json::from_value(data)?),
        })
    }
}

impl Serialize for NodeData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Act(s)
            | Self::Chapter(s)
            | Self::Page(s)
            | Self::Detour(s)
            | Self::Storylet(s)
            | Self::Jump(s)
            | Self::End(s) => s.serialize(serializer),
            Self::Character(c) => c.serialize(serializer),
            Self::Player(p) => p.serialize(serializer),
            Self::Conditional(c) => c.serialize(serializer),
        }
    }
}

/// Wire representation of a [`FlowNode`]: `{id, type, position, data}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WireNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A node on the canvas.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "WireNode")]
pub struct FlowNode {
    pub id: String,
    pub position: Position,
    pub data: NodeData,
}

impl FlowNode {
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.data.node_type()
    }
}

impl TryFrom<WireNode> for FlowNode {
    type Error = serde_json::Error;

    fn try_from(wire: WireNode) -> Result<Self, Self::Error> {
        Ok(Self {
            data: NodeData::from_wire(wire.node_type, wire.data)?,
            id: wire.id,
            position: wire.position,
        })
    }
}

#[derive(Serialize)]
struct WireNodeRef<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    node_type: NodeType,
    position: &'a Position,
    data: &'a NodeData,
}

impl Serialize for FlowNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireNodeRef {
            id: &self.id,
            node_type: self.node_type(),
            position: &self.position,
            data: &self.data,
        }
        .serialize(serializer)
    }
}

fn default_edge_type() -> String {
    "default".to_owned()
}

/// Wire representation of a [`FlowEdge`]. `kind` is always written from the
/// source handle and ignored on input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(rename = "type", default = "default_edge_type")]
    pub edge_type: String,
    #[serde(default)]
    pub kind: Option<EdgeKind>,
}

/// A drawn edge. Its [`EdgeKind`] follows from `source_handle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireEdge", into = "WireEdge")]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
    /// Canvas edge type.
    pub edge_type: String,
}

impl FlowEdge {
    /// Parsed source handle.
    #[must_use]
    pub fn handle(&self) -> Handle {
        Handle::parse(self.source_handle.as_deref())
    }

    #[must_use]
    pub fn kind(&self) -> EdgeKind {
        self.handle().kind()
    }
}

impl From<WireEdge> for FlowEdge {
    fn from(wire: WireEdge) -> Self {
        Self {
            id: wire.id,
            source: wire.source,
            target: wire.target,
            source_handle: wire.source_handle,
            target_handle: wire.target_handle,
            edge_type: wire.edge_type,
        }
    }
}

impl From<FlowEdge> for WireEdge {
    fn from(edge: FlowEdge) -> Self {
        Self {
            kind: Some(edge.kind()),
            id: edge.id,
            source: edge.source,
            target: edge.target,
            source_handle: edge.source_handle,
            target_handle: edge.target_handle,
            edge_type: edge.edge_type,
        }
    }
}

/// Visual layer of a document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Flow {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    pub viewport: Viewport,
}

/// A node that ends the graph, with the exit key a detour returns through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndNode {
    pub node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_key: Option<String>,
}

/// A narrative or storylet graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
    pub id: String,
    #[serde(rename = "project")]
    pub project_id: String,
    pub kind: GraphKind,
    pub title: String,
    /// Empty when unset.
    #[serde(default)]
    pub start_node_id: String,
    #[serde(default)]
    pub end_node_ids: Vec<EndNode>,
    #[serde(default)]
    pub flow: Flow,
    /// Runtime dialogue compiled from this graph by the export collaborator.
    #[serde(rename = "compiledYarn", default, skip_serializing_if = "Option::is_none")]
    pub compiled_output: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GraphDocument {
    /// Creates a document holding only its start node.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        project_id: impl Into<String>,
        kind: GraphKind,
        title: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let start = editor::create_node(kind.start_node_type(), START_NODE_ID, 0.0, 0.0);
        Self {
            id: id.into(),
            project_id: project_id.into(),
            kind,
            title: title.into(),
            start_node_id: START_NODE_ID.to_owned(),
            end_node_ids: Vec::new(),
            flow: Flow {
                nodes: vec![start],
                ..Flow::default()
            },
            compiled_output: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The start node, or `None` when unset or missing.
    #[must_use]
    pub fn start_node(&self) -> Option<&FlowNode> {
        if self.start_node_id.is_empty() {
            return None;
        }
        self.node(&self.start_node_id)
    }

    #[must_use]
    pub fn node(&self, node_id: &str) -> Option<&FlowNode> {
        self.flow.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn node_mut(&mut self, node_id: &str) -> Option<&mut FlowNode> {
        self.flow.nodes.iter_mut().find(|n| n.id == node_id)
    }

    #[must_use]
    pub fn contains_node(&self, node_id: &str) -> bool {
        self.node(node_id).is_some()
    }

    #[must_use]
    pub fn edge(&self, edge_id: &str) -> Option<&FlowEdge> {
        self.flow.edges.iter().find(|e| e.id == edge_id)
    }

    /// Set of node ids present in the flow layer.
    #[must_use]
    pub fn node_ids(&self) -> HashSet<&str> {
        self.flow.nodes.iter().map(|n| n.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_new_document_holds_only_start_node() {
        let graph = GraphDocument::new("g1", "p1", GraphKind::Narrative, "Prologue", fixed_now());

        assert_eq!(graph.flow.nodes.len(), 1);
        assert!(graph.flow.edges.is_empty());
        let start = graph.start_node().unwrap();
        assert_eq!(start.id, START_NODE_ID);
        assert_eq!(start.node_type(), NodeType::Act);
    }

    #[test]
    fn test_storylet_document_starts_with_storylet_node() {
        let graph = GraphDocument::new("g2", "p1", GraphKind::Storylet, "Side", fixed_now());

        assert_eq!(graph.start_node().unwrap().node_type(), NodeType::Storylet);
    }

    #[test]
    fn test_start_node_is_none_when_unset_or_missing() {
        let mut graph = GraphDocument::new("g1", "p1", GraphKind::Narrative, "T", fixed_now());
        graph.start_node_id = String::new();
        assert!(graph.start_node().is_none());

        graph.start_node_id = "ghost".to_owned();
        assert!(graph.start_node().is_none());
    }

    #[test]
    fn test_document_serializes_wire_field_names() {
        let graph = GraphDocument::new("g1", "p1", GraphKind::Narrative, "T", fixed_now());

        let json = serde_json::to_value(&graph).unwrap();

        assert_eq!(json["project"], "p1");
        assert_eq!(json["kind"], "NARRATIVE");
        assert_eq!(json["startNodeId"], "start");
        assert_eq!(json["flow"]["nodes"][0]["type"], "ACT");
        assert_eq!(json["flow"]["viewport"]["zoom"], 1.0);
        assert!(json.get("compiledYarn").is_none());
    }

    #[test]
    fn test_wire_node_decodes_player_choices() {
        let raw = json!({
            "id": "n1",
            "type": "PLAYER",
            "position": { "x": 10.0, "y": 20.0 },
            "data": { "choices": [ { "id": "c1", "text": "Go", "nextNodeId": "n2" } ] }
        });

        let node: FlowNode = serde_json::from_value(raw).unwrap();

        assert_eq!(node.node_type(), NodeType::Player);
        assert_eq!(node.data.child_ids(), vec!["n2"]);
        assert_eq!(node.position, Position::new(10.0, 20.0));
    }

    #[test]
    fn test_wire_node_with_null_data_decodes_empty_payload() {
        let raw = json!({ "id": "n9", "type": "END", "data": null });

        let node: FlowNode = serde_json::from_value(raw).unwrap();

        assert_eq!(node.data, NodeData::End(StructuralData::default()));
    }

    #[test]
    fn test_node_serializes_payload_as_data_object() {
        let raw = json!({
            "id": "n1",
            "type": "PLAYER",
            "position": { "x": 1.0, "y": 2.0 },
            "data": { "choices": [ { "id": "c1", "text": "Go", "nextNodeId": "n2" } ] }
        });
        let node: FlowNode = serde_json::from_value(raw).unwrap();

        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "PLAYER");
        assert_eq!(json["data"]["choices"][0]["nextNodeId"], "n2");
        assert_eq!(serde_json::from_value::<FlowNode>(json).unwrap(), node);
    }

    #[test]
    fn test_edge_without_kind_takes_kind_from_handle() {
        let raw = json!({ "id": "e1", "source": "a", "target": "b", "sourceHandle": "choice-0" });

        let edge: FlowEdge = serde_json::from_value(raw).unwrap();

        assert_eq!(edge.kind(), EdgeKind::Choice);
        assert_eq!(edge.edge_type, "default");
    }

    #[test]
    fn test_edge_kind_on_the_wire_is_rederived_from_handle() {
        // Arrange
        let raw = json!({
            "id": "e1",
            "source": "a",
            "target": "b",
            "sourceHandle": "choice-0",
            "type": "choice",
            "kind": "VISUAL"
        });

        // Act
        let edge: FlowEdge = serde_json::from_value(raw).unwrap();
        let json = serde_json::to_value(&edge).unwrap();

        // Assert
        assert_eq!(edge.kind(), EdgeKind::Choice);
        assert_eq!(json["kind"], "CHOICE");
        assert_eq!(json["sourceHandle"], "choice-0");
    }

    #[test]
    fn test_conditional_block_type_uses_uppercase_keywords() {
        let block = ConditionalBlock {
            id: "b1".to_owned(),
            block_type: BlockType::ElseIf,
            ..ConditionalBlock::default()
        };

        let json = serde_json::to_value(&block).unwrap();

        assert_eq!(json["type"], "ELSEIF");
    }

    #[test]
    fn test_scrub_target_clears_every_matching_choice() {
        let mut data = NodeData::Player(PlayerData {
            choices: vec![
                Choice {
                    id: "c1".to_owned(),
                    next_node_id: Some("x".to_owned()),
                    ..Choice::default()
                },
                Choice {
                    id: "c2".to_owned(),
                    next_node_id: Some("y".to_owned()),
                    ..Choice::default()
                },
                Choice {
                    id: "c3".to_owned(),
                    next_node_id: Some("x".to_owned()),
                    ..Choice::default()
                },
            ],
        });

        assert!(data.scrub_target("x"));
        assert_eq!(data.child_ids(), vec!["y"]);
        assert!(!data.scrub_target("x"));
    }

    #[test]
    fn test_set_slot_rejects_missing_slots() {
        let mut player = NodeData::Player(PlayerData::default());
        assert!(!player.set_slot(&Handle::Next, Some("x".to_owned())));
        assert!(!player.set_slot(&Handle::Choice(0), Some("x".to_owned())));

        let mut page = NodeData::empty(NodeType::Page);
        assert!(page.set_slot(&Handle::Next, Some("x".to_owned())));
        assert_eq!(page.default_next(), Some("x"));
        assert!(!page.set_slot(&Handle::Block(0), Some("y".to_owned())));
    }

    #[test]
    fn test_graph_kind_parses_case_insensitively() {
        assert_eq!("storylet".parse::<GraphKind>(), Ok(GraphKind::Storylet));
        assert_eq!("NARRATIVE".parse::<GraphKind>(), Ok(GraphKind::Narrative));
        assert!("chapter".parse::<GraphKind>().is_err());
    }
}
