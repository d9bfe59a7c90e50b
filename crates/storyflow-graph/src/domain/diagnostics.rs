//! Commit-gating diagnostics.
//!
//! Blocking issues refuse a commit; warnings are surfaced to the author but
//! never stop one. Findings are data, not errors.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::document::{BlockType, GraphDocument, NodeData};
use super::hierarchy::validate_tree_structure;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Blocking,
    Warning,
}

/// One diagnostic finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_id: Option<String>,
}

impl ValidationIssue {
    fn blocking(code: &str, message: String) -> Self {
        Self {
            severity: Severity::Blocking,
            code: code.to_owned(),
            message,
            node_id: None,
            edge_id: None,
        }
    }

    fn warning(code: &str, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::blocking(code, message)
        }
    }

    fn on_node(mut self, node_id: &str) -> Self {
        self.node_id = Some(node_id.to_owned());
        self
    }

    fn on_edge(mut self, edge_id: &str) -> Self {
        self.edge_id = Some(edge_id.to_owned());
        self
    }
}

/// The full diagnostic result for a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn blocking(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Blocking)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    #[must_use]
    pub fn has_blocking(&self) -> bool {
        self.blocking().next().is_some()
    }

    /// Messages of the blocking issues, as carried by a refused commit.
    #[must_use]
    pub fn blocking_messages(&self) -> Vec<String> {
        self.blocking().map(|i| i.message.clone()).collect()
    }

    /// Whether any issue has `code`.
    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

/// Runs every check against `graph`.
#[must_use]
pub fn diagnose(graph: &GraphDocument) -> ValidationReport {
    let mut issues: Vec<ValidationIssue> = validate_tree_structure(graph)
        .errors
        .iter()
        .map(|e| {
            let issue = ValidationIssue::blocking(e.code(), e.message());
            match e.node_id() {
                Some(id) => issue.on_node(id),
                None => issue,
            }
        })
        .collect();

    check_duplicate_ids(graph, &mut issues);
    check_edges(graph, &mut issues);
    check_end_nodes(graph, &mut issues);
    check_pointers_have_edges(graph, &mut issues);
    check_content(graph, &mut issues);

    ValidationReport { issues }
}

fn check_duplicate_ids(graph: &GraphDocument, issues: &mut Vec<ValidationIssue>) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for node in &graph.flow.nodes {
        *counts.entry(node.id.as_str()).or_default() += 1;
    }
    let mut reported = HashSet::new();
    for node in &graph.flow.nodes {
        let id = node.id.as_str();
        if counts[id] > 1 && reported.insert(id) {
            issues.push(
                ValidationIssue::blocking(
                    "duplicate_node_id",
                    format!("node id {id} is used {} times", counts[id]),
                )
                .on_node(id),
            );
        }
    }
}

fn check_edges(graph: &GraphDocument, issues: &mut Vec<ValidationIssue>) {
    let node_ids = graph.node_ids();
    for edge in &graph.flow.edges {
        if !node_ids.contains(edge.source.as_str()) || !node_ids.contains(edge.target.as_str()) {
            issues.push(
                ValidationIssue::blocking(
                    "edge_endpoint_missing",
                    format!(
                        "edge {} connects {} to {} but an endpoint is missing",
                        edge.id, edge.source, edge.target
                    ),
                )
                .on_edge(&edge.id),
            );
            continue;
        }
        if !edge.kind().is_semantic() {
            continue;
        }
        let in_sync = graph
            .node(&edge.source)
            .and_then(|n| n.data.slot_target(&edge.handle()).flatten())
            == Some(edge.target.as_str());
        if !in_sync {
            issues.push(
                ValidationIssue::warning(
                    "edge_out_of_sync",
                    format!(
                        "edge {} is drawn but node {} does not point at {}",
                        edge.id, edge.source, edge.target
                    ),
                )
                .on_node(&edge.source)
                .on_edge(&edge.id),
            );
        }
    }
}

fn check_end_nodes(graph: &GraphDocument, issues: &mut Vec<ValidationIssue>) {
    for end in &graph.end_node_ids {
        if !graph.contains_node(&end.node_id) {
            issues.push(
                ValidationIssue::blocking(
                    "end_node_missing",
                    format!("end node {} does not exist", end.node_id),
                )
                .on_node(&end.node_id),
            );
        }
    }
}

fn check_pointers_have_edges(graph: &GraphDocument, issues: &mut Vec<ValidationIssue>) {
    let node_ids = graph.node_ids();
    for node in &graph.flow.nodes {
        for (handle, target) in node.data.semantic_links() {
            // Dangling pointers are already reported by the tree check.
            if !node_ids.contains(target) {
                continue;
            }
            let drawn = graph
                .flow
                .edges
                .iter()
                .any(|e| e.source == node.id && e.target == target && e.handle() == handle);
            if !drawn {
                issues.push(
                    ValidationIssue::warning(
                        "pointer_without_edge",
                        format!("node {} points at {target} through {handle} with no edge", node.id),
                    )
                    .on_node(&node.id),
                );
            }
        }
    }
}

fn check_content(graph: &GraphDocument, issues: &mut Vec<ValidationIssue>) {
    for node in &graph.flow.nodes {
        match &node.data {
            NodeData::Player(player) => {
                if player.choices.is_empty() {
                    issues.push(
                        ValidationIssue::warning(
                            "player_without_choices",
                            format!("player node {} offers no choices", node.id),
                        )
                        .on_node(&node.id),
                    );
                }
                for (i, choice) in player.choices.iter().enumerate() {
                    if choice.text.trim().is_empty() {
                        issues.push(
                            ValidationIssue::warning(
                                "empty_choice_text",
                                format!("choice {i} of node {} has no text", node.id),
                            )
                            .on_node(&node.id),
                        );
                    }
                }
            }
            NodeData::Conditional(conditional) => {
                let last = conditional.conditional_blocks.len().saturating_sub(1);
                for (i, block) in conditional.conditional_blocks.iter().enumerate() {
                    let misplaced = match block.block_type {
                        BlockType::If => i != 0,
                        BlockType::ElseIf => i == 0,
                        BlockType::Else => i == 0 || i != last,
                    };
                    if misplaced {
                        issues.push(
                            ValidationIssue::warning(
                                "misplaced_conditional_block",
                                format!(
                                    "block {i} of node {} cannot be {:?} at this position",
                                    node.id, block.block_type
                                ),
                            )
                            .on_node(&node.id),
                        );
                    }
                    let needs_condition = block.block_type != BlockType::Else;
                    let empty = block.condition.as_deref().is_none_or(|c| c.trim().is_empty());
                    if needs_condition && empty {
                        issues.push(
                            ValidationIssue::warning(
                                "empty_condition",
                                format!("block {i} of node {} has no condition", node.id),
                            )
                            .on_node(&node.id),
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{EndNode, FlowEdge, GraphKind, NodeType, Position};
    use crate::domain::editor::{self, Connection};
    use crate::domain::handle::Handle;
    use chrono::{TimeZone, Utc};

    fn base() -> GraphDocument {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let graph = GraphDocument::new("g1", "p1", GraphKind::Narrative, "Diag", now);
        let graph = editor::add_node(&graph, NodeType::Page, "a", Position::default()).unwrap();
        editor::apply_connection(&graph, &Connection::new("start", "a", None))
    }

    #[test]
    fn test_clean_graph_has_no_issues() {
        let report = diagnose(&base());

        assert!(report.issues.is_empty());
        assert!(!report.has_blocking());
    }

    #[test]
    fn test_orphan_is_blocking() {
        let graph = editor::add_node(&base(), NodeType::End, "z", Position::default()).unwrap();

        let report = diagnose(&graph);

        assert!(report.has_blocking());
        assert!(report.has_code("orphaned_node"));
        assert_eq!(report.blocking_messages().len(), 1);
    }

    #[test]
    fn test_duplicate_ids_reported_once() {
        let mut graph = base();
        let copy = graph.node("a").unwrap().clone();
        graph.flow.nodes.push(copy.clone());
        graph.flow.nodes.push(copy);

        let report = diagnose(&graph);

        let dupes: Vec<_> = report
            .issues
            .iter()
            .filter(|i| i.code == "duplicate_node_id")
            .collect();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].severity, Severity::Blocking);
        assert!(dupes[0].message.contains("3 times"));
    }

    #[test]
    fn test_edge_endpoint_and_end_node_missing_are_blocking() {
        let mut graph = base();
        graph.flow.edges.push(FlowEdge {
            id: "e_bad".to_owned(),
            source: "a".to_owned(),
            target: "ghost".to_owned(),
            source_handle: Some("note".to_owned()),
            target_handle: None,
            edge_type: "default".to_owned(),
        });
        graph.end_node_ids.push(EndNode {
            node_id: "gone".to_owned(),
            exit_key: None,
        });

        let report = diagnose(&graph);

        assert!(report.has_code("edge_endpoint_missing"));
        assert!(report.has_code("end_node_missing"));
        assert_eq!(report.blocking().count(), 2);
    }

    #[test]
    fn test_layer_drift_is_a_warning() {
        let mut graph = base();
        graph
            .node_mut("start")
            .unwrap()
            .data
            .set_slot(&Handle::Next, None);
        graph
            .node_mut("a")
            .unwrap()
            .data
            .set_slot(&Handle::Next, Some("start".to_owned()));

        let report = diagnose(&graph);

        assert!(report.has_code("edge_out_of_sync"));
        assert!(report.has_code("pointer_without_edge"));
        // start no longer reaches a
        assert!(report.has_code("orphaned_node"));
    }

    #[test]
    fn test_content_warnings_do_not_block() {
        let graph = editor::add_node(&base(), NodeType::Conditional, "c", Position::default())
            .unwrap();
        let graph = editor::apply_connection(&graph, &Connection::new("a", "c", None));
        let graph = editor::add_conditional_block(&graph, "c", BlockType::Else, None);
        let graph = editor::add_conditional_block(&graph, "c", BlockType::ElseIf, Some("x"));
        let graph = editor::add_node(&graph, NodeType::Player, "p", Position::default()).unwrap();
        let graph = editor::apply_connection(&graph, &Connection::new("c", "p", Some("block-0")));
        let graph = editor::set_choice_text(&graph, "p", 0, "  ");

        let report = diagnose(&graph);

        assert!(!report.has_blocking());
        assert!(report.has_code("misplaced_conditional_block"));
        assert!(report.has_code("empty_condition"));
        assert!(report.has_code("empty_choice_text"));
        assert!(!report.has_code("player_without_choices"));
    }

    #[test]
    fn test_report_serializes_severity_snake_case() {
        let graph = editor::add_node(&base(), NodeType::End, "z", Position::default()).unwrap();

        let json = serde_json::to_value(diagnose(&graph)).unwrap();

        assert_eq!(json["issues"][0]["severity"], "blocking");
        assert_eq!(json["issues"][0]["nodeId"], "z");
    }
}
