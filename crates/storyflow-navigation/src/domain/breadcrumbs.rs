//! Per-scope breadcrumb stacks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use storyflow_graph::GraphKind;
use tracing::debug;

/// One visited graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breadcrumb {
    pub graph_id: String,
    pub title: String,
    pub scope: GraphKind,
}

impl Breadcrumb {
    #[must_use]
    pub fn new(graph_id: impl Into<String>, title: impl Into<String>, scope: GraphKind) -> Self {
        Self {
            graph_id: graph_id.into(),
            title: title.into(),
            scope,
        }
    }
}

/// Navigation history, one stack per scope.
#[derive(Debug, Clone, Default)]
pub struct BreadcrumbNavigator {
    stacks: HashMap<GraphKind, Vec<Breadcrumb>>,
}

impl BreadcrumbNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `crumb` onto its scope's stack unless it repeats the top entry.
    /// Returns whether the stack grew.
    pub fn push(&mut self, crumb: Breadcrumb) -> bool {
        let stack = self.stacks.entry(crumb.scope).or_default();
        if stack
            .last()
            .is_some_and(|top| top.graph_id == crumb.graph_id && top.scope == crumb.scope)
        {
            return false;
        }
        debug!(graph_id = %crumb.graph_id, scope = %crumb.scope, "breadcrumb pushed");
        stack.push(crumb);
        true
    }

    /// Removes and returns the top entry of `scope`.
    pub fn pop(&mut self, scope: GraphKind) -> Option<Breadcrumb> {
        self.stacks.get_mut(&scope).and_then(Vec::pop)
    }

    /// Truncates `scope` to `[0..=index]` and returns the entry now on top,
    /// which the caller reopens without pushing again. Out of range leaves
    /// the stack untouched.
    pub fn navigate_to(&mut self, scope: GraphKind, index: usize) -> Option<Breadcrumb> {
        let stack = self.stacks.get_mut(&scope)?;
        let target = stack.get(index)?.clone();
        stack.truncate(index + 1);
        Some(target)
    }

    pub fn clear(&mut self, scope: GraphKind) {
        self.stacks.remove(&scope);
    }

    /// The top entry of `scope`.
    #[must_use]
    pub fn current(&self, scope: GraphKind) -> Option<&Breadcrumb> {
        self.stacks.get(&scope).and_then(|s| s.last())
    }

    /// The whole stack of `scope`, oldest first.
    #[must_use]
    pub fn breadcrumbs(&self, scope: GraphKind) -> &[Breadcrumb] {
        self.stacks
            .get(&scope)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
