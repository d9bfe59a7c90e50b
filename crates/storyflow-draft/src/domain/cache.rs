//! Resolved-graph cache with per-graph resolution status.

use std::collections::HashMap;

use serde::Serialize;
use storyflow_graph::GraphDocument;

/// Where a graph is in its resolution lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "camelCase")]
pub enum ResolutionStatus {
    Loading,
    Ready,
    Error(String),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    status: ResolutionStatus,
    graph: Option<GraphDocument>,
}

/// Graphs fetched from the persistence collaborator, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct GraphCache {
    entries: HashMap<String, CacheEntry>,
}

impl GraphCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `graph_id` as being fetched. A previously cached document is
    /// kept but no longer served until the fetch settles.
    pub fn mark_loading(&mut self, graph_id: &str) {
        self.entries
            .entry(graph_id.to_owned())
            .and_modify(|e| e.status = ResolutionStatus::Loading)
            .or_insert(CacheEntry {
                status: ResolutionStatus::Loading,
                graph: None,
            });
    }

    /// Stores a resolved document.
    pub fn mark_ready(&mut self, graph: GraphDocument) {
        self.entries.insert(
            graph.id.clone(),
            CacheEntry {
                status: ResolutionStatus::Ready,
                graph: Some(graph),
            },
        );
    }

    /// Records a failed fetch.
    pub fn mark_error(&mut self, graph_id: &str, message: impl Into<String>) {
        let status = ResolutionStatus::Error(message.into());
        self.entries
            .entry(graph_id.to_owned())
            .and_modify(|e| e.status = status.clone())
            .or_insert(CacheEntry {
                status,
                graph: None,
            });
    }

    /// The cached document, only when its status is `Ready`.
    #[must_use]
    pub fn ready(&self, graph_id: &str) -> Option<&GraphDocument> {
        self.entries
            .get(graph_id)
            .filter(|e| e.status == ResolutionStatus::Ready)
            .and_then(|e| e.graph.as_ref())
    }

    #[must_use]
    pub fn status(&self, graph_id: &str) -> Option<&ResolutionStatus> {
        self.entries.get(graph_id).map(|e| &e.status)
    }

    /// Drops `graph_id` from the cache. Returns whether it was present.
    pub fn evict(&mut self, graph_id: &str) -> bool {
        self.entries.remove(graph_id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyflow_graph::GraphKind;
    use storyflow_test_support::linear_graph;

    #[test]
    fn test_loading_then_ready_serves_graph() {
        // Arrange
        let mut cache = GraphCache::new();

        // Act
        cache.mark_loading("g1");
        let while_loading = cache.ready("g1").is_some();
        cache.mark_ready(linear_graph("g1", GraphKind::Narrative));

        // Assert
        assert!(!while_loading);
        assert_eq!(cache.status("g1"), Some(&ResolutionStatus::Ready));
        assert_eq!(cache.ready("g1").unwrap().id, "g1");
    }

    #[test]
    fn test_error_is_recorded_and_hides_stale_graph() {
        let mut cache = GraphCache::new();
        cache.mark_ready(linear_graph("g1", GraphKind::Narrative));

        cache.mark_loading("g1");
        cache.mark_error("g1", "timeout");

        assert_eq!(
            cache.status("g1"),
            Some(&ResolutionStatus::Error("timeout".to_owned()))
        );
        assert!(cache.ready("g1").is_none());
    }

    #[test]
    fn test_evict_forgets_entry() {
        let mut cache = GraphCache::new();
        cache.mark_error("g1", "boom");

        assert!(cache.evict("g1"));
        assert!(cache.status("g1").is_none());
        assert!(!cache.evict("g1"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_status_serializes_with_message() {
        let json = serde_json::to_value(ResolutionStatus::Error("nope".to_owned())).unwrap();

        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "nope");
        assert_eq!(
            serde_json::to_value(ResolutionStatus::Ready).unwrap()["status"],
            "ready"
        );
    }
}
