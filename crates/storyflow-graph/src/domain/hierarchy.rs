//! Spanning-tree view of a graph document.
//!
//! The tree is built from the start node by following semantic pointers.
//! It is an approximation of the underlying graph: a node reached a second
//! time (through a cycle or a diamond) becomes a terminal reference entry and
//! is never descended again, so every node has exactly one materialized
//! parent, the first one discovered.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use super::document::{GraphDocument, NodeType};

/// One entry of the hierarchy arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    pub node_type: NodeType,
    /// Arena index of the parent entry.
    pub parent: Option<usize>,
    /// Arena indices of the child entries, in slot order.
    pub children: Vec<usize>,
    pub depth: usize,
    /// A repeat sighting of a node materialized elsewhere; never has children.
    pub reference: bool,
}

/// Arena-backed spanning tree rooted at the start node.
///
/// Entries are stored in pre-order, so a parent always precedes its children.
#[derive(Debug, Clone, Serialize)]
pub struct Hierarchy {
    entries: Vec<TreeNode>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

/// Builds the spanning tree of `graph`, or `None` when the start node is
/// unset or missing.
#[must_use]
pub fn create_hierarchy(graph: &GraphDocument) -> Option<Hierarchy> {
    let start = graph.start_node()?;

    let mut entries: Vec<TreeNode> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut stack: Vec<(&str, Option<usize>)> = vec![(start.id.as_str(), None)];

    while let Some((id, parent)) = stack.pop() {
        let Some(node) = graph.node(id) else {
            continue;
        };
        let depth = parent.map_or(0, |p| entries[p].depth + 1);
        let position = entries.len();
        let reference = index.contains_key(id);
        entries.push(TreeNode {
            id: id.to_owned(),
            node_type: node.node_type(),
            parent,
            children: Vec::new(),
            depth,
            reference,
        });
        if let Some(p) = parent {
            entries[p].children.push(position);
        }
        if reference {
            continue;
        }
        index.insert(id.to_owned(), position);

        let children = node.data.child_ids();
        for child in children.into_iter().rev() {
            if graph.contains_node(child) {
                stack.push((child, Some(position)));
            }
        }
    }

    Some(Hierarchy { entries, index })
}

impl Hierarchy {
    /// The root entry.
    #[must_use]
    pub fn root(&self) -> &TreeNode {
        &self.entries[0]
    }

    /// All entries in pre-order, references included.
    #[must_use]
    pub fn entries(&self) -> &[TreeNode] {
        &self.entries
    }

    /// Number of materialized (non-reference) nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The materialized entry for `id`.
    #[must_use]
    pub fn find_node(&self, id: &str) -> Option<&TreeNode> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Ancestor ids of `id`, root first, excluding `id` itself.
    #[must_use]
    pub fn ancestors(&self, id: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let Some(&start) = self.index.get(id) else {
            return chain;
        };
        let mut cursor = self.entries[start].parent;
        while let Some(i) = cursor {
            chain.push(self.entries[i].id.as_str());
            cursor = self.entries[i].parent;
        }
        chain.reverse();
        chain
    }

    /// Descendant ids of `id` in pre-order, excluding `id` and reference
    /// entries.
    #[must_use]
    pub fn descendants(&self, id: &str) -> Vec<&str> {
        let mut found = Vec::new();
        let Some(&start) = self.index.get(id) else {
            return found;
        };
        let mut stack: Vec<usize> = self.entries[start].children.iter().rev().copied().collect();
        while let Some(i) = stack.pop() {
            let entry = &self.entries[i];
            if entry.reference {
                continue;
            }
            found.push(entry.id.as_str());
            stack.extend(entry.children.iter().rev().copied());
        }
        found
    }

    /// Distance from the root; the root has depth 0.
    #[must_use]
    pub fn depth(&self, id: &str) -> Option<usize> {
        self.find_node(id).map(|n| n.depth)
    }

    /// Length of the longest downward path; leaves have height 0.
    #[must_use]
    pub fn height(&self, id: &str) -> Option<usize> {
        let &target = self.index.get(id)?;
        let mut heights = vec![0usize; self.entries.len()];
        // Children always follow their parent in the arena.
        for i in (target..self.entries.len()).rev() {
            heights[i] = self.entries[i]
                .children
                .iter()
                .map(|&c| heights[c] + 1)
                .max()
                .unwrap_or(0);
        }
        Some(heights[target])
    }

    /// The tree path `[from, .., to]`, or `None` if `to` is not a descendant
    /// of `from` in this spanning tree.
    ///
    /// Only the first-discovered route is considered; another path through
    /// the underlying graph may exist.
    #[must_use]
    pub fn find_path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let &from_index = self.index.get(from)?;
        let &to_index = self.index.get(to)?;

        let mut path = vec![self.entries[to_index].id.clone()];
        let mut cursor = to_index;
        while cursor != from_index {
            cursor = self.entries[cursor].parent?;
            path.push(self.entries[cursor].id.clone());
        }
        path.reverse();
        Some(path)
    }
}

/// A structural problem found by [`validate_tree_structure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TreeIssue {
    MissingStartNode { start_node_id: String },
    DanglingReference { node_id: String, target_id: String },
    OrphanedNode { node_id: String },
}

impl TreeIssue {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingStartNode { .. } => "missing_start_node",
            Self::DanglingReference { .. } => "dangling_reference",
            Self::OrphanedNode { .. } => "orphaned_node",
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::MissingStartNode { start_node_id } if start_node_id.is_empty() => {
                "graph has no start node".to_owned()
            }
            Self::MissingStartNode { start_node_id } => {
                format!("start node {start_node_id} does not exist")
            }
            Self::DanglingReference { node_id, target_id } => {
                format!("node {node_id} points at missing node {target_id}")
            }
            Self::OrphanedNode { node_id } => {
                format!("node {node_id} is not reachable from the start node")
            }
        }
    }

    /// The node the issue is attached to, if any.
    #[must_use]
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::MissingStartNode { .. } => None,
            Self::DanglingReference { node_id, .. } | Self::OrphanedNode { node_id } => {
                Some(node_id.as_str())
            }
        }
    }
}

/// Outcome of a tree structure check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeValidation {
    pub valid: bool,
    pub errors: Vec<TreeIssue>,
}

/// Breadth-first structural check from the start node.
///
/// Reports a missing start node, pointers to absent nodes, and nodes that
/// are never reached from start. Orphans are only reported when a start node
/// exists to reach them from.
#[must_use]
pub fn validate_tree_structure(graph: &GraphDocument) -> TreeValidation {
    let mut errors = Vec::new();
    let node_ids = graph.node_ids();

    let start = graph.start_node();
    if start.is_none() {
        errors.push(TreeIssue::MissingStartNode {
            start_node_id: graph.start_node_id.clone(),
        });
    }

    for node in &graph.flow.nodes {
        for target in node.data.child_ids() {
            if !node_ids.contains(target) {
                errors.push(TreeIssue::DanglingReference {
                    node_id: node.id.clone(),
                    target_id: target.to_owned(),
                });
            }
        }
    }

    if let Some(start) = start {
        let mut visited: HashSet<&str> = HashSet::from([start.id.as_str()]);
        let mut queue: VecDeque<&str> = VecDeque::from([start.id.as_str()]);
        while let Some(id) = queue.pop_front() {
            let Some(node) = graph.node(id) else {
                continue;
            };
            for child in node.data.child_ids() {
                if node_ids.contains(child) && visited.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        for node in &graph.flow.nodes {
            if !visited.contains(node.id.as_str()) {
                errors.push(TreeIssue::OrphanedNode {
                    node_id: node.id.clone(),
                });
            }
        }
    }

    TreeValidation {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{GraphKind, Position};
    use crate::domain::editor::{self, Connection};
    use chrono::{TimeZone, Utc};

    fn build(nodes: &[(NodeType, &str)], links: &[(&str, &str, Option<&str>)]) -> GraphDocument {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let mut graph = GraphDocument::new("g1", "p1", GraphKind::Narrative, "Tree", now);
        for (node_type, id) in nodes {
            graph = editor::add_node(&graph, *node_type, id, Position::default()).unwrap();
        }
        for (source, target, handle) in links {
            graph = editor::apply_connection(&graph, &Connection::new(*source, *target, *handle));
        }
        graph
    }

    /// start → p (PLAYER, two choices) → {a → leaf, b}
    fn branching() -> GraphDocument {
        let graph = build(
            &[
                (NodeType::Player, "p"),
                (NodeType::Page, "a"),
                (NodeType::Page, "b"),
                (NodeType::End, "leaf"),
            ],
            &[],
        );
        let graph = editor::add_choice(&graph, "p", "Right");
        let links = [
            ("start", "p", None),
            ("p", "a", Some("choice-0")),
            ("p", "b", Some("choice-1")),
            ("a", "leaf", None),
        ];
        links.iter().fold(graph, |g, (s, t, h)| {
            editor::apply_connection(&g, &Connection::new(*s, *t, *h))
        })
    }

    #[test]
    fn test_create_hierarchy_returns_none_without_start() {
        let mut graph = branching();
        graph.start_node_id = "missing".to_owned();

        assert!(create_hierarchy(&graph).is_none());
    }

    #[test]
    fn test_hierarchy_follows_choices_in_order() {
        let tree = create_hierarchy(&branching()).unwrap();

        let ids: Vec<&str> = tree.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["start", "p", "a", "leaf", "b"]);
        assert_eq!(tree.root().id, "start");
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_ancestors_descendants_depth_height() {
        let tree = create_hierarchy(&branching()).unwrap();

        assert_eq!(tree.ancestors("leaf"), vec!["start", "p", "a"]);
        assert!(tree.ancestors("start").is_empty());
        assert_eq!(tree.descendants("p"), vec!["a", "leaf", "b"]);
        assert_eq!(tree.depth("leaf"), Some(3));
        assert_eq!(tree.height("start"), Some(3));
        assert_eq!(tree.height("b"), Some(0));
        assert_eq!(tree.height("ghost"), None);
    }

    #[test]
    fn test_find_path_in_tree_shaped_graph() {
        let tree = create_hierarchy(&branching()).unwrap();

        assert_eq!(
            tree.find_path("start", "leaf"),
            Some(vec![
                "start".to_owned(),
                "p".to_owned(),
                "a".to_owned(),
                "leaf".to_owned()
            ])
        );
        assert_eq!(tree.find_path("p", "p"), Some(vec!["p".to_owned()]));
        assert_eq!(tree.find_path("b", "leaf"), None);
    }

    #[test]
    fn test_cycle_terminates_with_reference_entry() {
        let graph = build(
            &[(NodeType::Page, "a"), (NodeType::Page, "b")],
            &[("start", "a", None), ("a", "b", None), ("b", "a", None)],
        );

        let tree = create_hierarchy(&graph).unwrap();

        assert_eq!(tree.entries().len(), 4);
        let last = &tree.entries()[3];
        assert_eq!(last.id, "a");
        assert!(last.reference);
        assert!(last.children.is_empty());
        assert_eq!(tree.depth("a"), Some(1));
        assert_eq!(tree.descendants("start"), vec!["a", "b"]);
    }

    #[test]
    fn test_diamond_keeps_first_discovered_parent() {
        let graph = build(
            &[
                (NodeType::Conditional, "c"),
                (NodeType::Page, "x"),
                (NodeType::Page, "y"),
                (NodeType::End, "z"),
            ],
            &[
                ("start", "c", None),
                ("c", "x", Some("block-0")),
                ("x", "z", None),
            ],
        );
        let graph = editor::add_conditional_block(
            &graph,
            "c",
            crate::domain::document::BlockType::Else,
            None,
        );
        let graph = editor::apply_connection(&graph, &Connection::new("c", "y", Some("block-1")));
        let graph = editor::apply_connection(&graph, &Connection::new("y", "z", None));

        let tree = create_hierarchy(&graph).unwrap();

        assert_eq!(tree.ancestors("z"), vec!["start", "c", "x"]);
        assert_eq!(tree.find_path("y", "z"), None);
    }

    #[test]
    fn test_validate_flags_dangling_and_orphans() {
        let mut graph = build(
            &[(NodeType::Page, "a"), (NodeType::Page, "lonely")],
            &[("start", "a", None)],
        );
        graph
            .node_mut("a")
            .unwrap()
            .data
            .set_slot(&crate::domain::handle::Handle::Next, Some("ghost".to_owned()));

        let report = validate_tree_structure(&graph);

        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![
                TreeIssue::DanglingReference {
                    node_id: "a".to_owned(),
                    target_id: "ghost".to_owned()
                },
                TreeIssue::OrphanedNode {
                    node_id: "lonely".to_owned()
                },
            ]
        );
    }

    #[test]
    fn test_validate_reports_missing_start_without_orphans() {
        let mut graph = build(&[(NodeType::Page, "a")], &[]);
        graph.start_node_id = String::new();

        let report = validate_tree_structure(&graph);

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code(), "missing_start_node");
        assert_eq!(report.errors[0].message(), "graph has no start node");
    }

    #[test]
    fn test_validate_connected_graph_is_valid() {
        let report = validate_tree_structure(&branching());

        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_scenario_delete_middle_node_orphans_tail() {
        let graph = build(
            &[
                (NodeType::Player, "n1"),
                (NodeType::Character, "n2"),
                (NodeType::End, "n3"),
            ],
            &[
                ("start", "n1", None),
                ("n1", "n2", Some("choice-0")),
                ("n2", "n3", None),
            ],
        );

        let graph = editor::delete_node(&graph, "n2").unwrap();
        let report = validate_tree_structure(&graph);

        assert_eq!(
            report.errors,
            vec![TreeIssue::OrphanedNode {
                node_id: "n3".to_owned()
            }]
        );
    }

    #[test]
    fn test_tree_issue_serializes_with_code_tag() {
        let issue = TreeIssue::DanglingReference {
            node_id: "a".to_owned(),
            target_id: "b".to_owned(),
        };

        let json = serde_json::to_value(&issue).unwrap();

        assert_eq!(json["code"], "dangling_reference");
        assert_eq!(json["targetId"], "b");
    }
}
