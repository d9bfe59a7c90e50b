//! Connection handles and the edge kinds they imply.
//!
//! A handle names the slot on a source node that an edge leaves from. The
//! handle alone decides which semantic pointer (if any) the edge stands for.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical name of the generic flow handle.
pub const NEXT_HANDLE: &str = "next";

const DEFAULT_HANDLE: &str = "default";
const CHOICE_PREFIX: &str = "choice-";
const BLOCK_PREFIX: &str = "block-";

/// Parsed form of an edge's `sourceHandle`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Handle {
    /// Absent, `next` or `default`: the node's default next pointer.
    Next,
    /// `choice-N`: the N-th player choice.
    Choice(usize),
    /// `block-N`: the N-th conditional block.
    Block(usize),
    /// Any other name; cosmetic only.
    Visual(String),
}

impl Handle {
    /// Parses a raw source handle.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Next;
        };
        if raw.is_empty() || raw == NEXT_HANDLE || raw == DEFAULT_HANDLE {
            return Self::Next;
        }
        if let Some(index) = raw.strip_prefix(CHOICE_PREFIX).and_then(parse_index) {
            return Self::Choice(index);
        }
        if let Some(index) = raw.strip_prefix(BLOCK_PREFIX).and_then(parse_index) {
            return Self::Block(index);
        }
        Self::Visual(raw.to_owned())
    }

    /// Returns the edge kind implied by this handle.
    #[must_use]
    pub fn kind(&self) -> EdgeKind {
        match self {
            Self::Next => EdgeKind::Flow,
            Self::Choice(_) => EdgeKind::Choice,
            Self::Block(_) => EdgeKind::Condition,
            Self::Visual(_) => EdgeKind::Visual,
        }
    }
}

/// Accepts only the canonical decimal form, so a parsed handle prints back
/// to the same string.
fn parse_index(digits: &str) -> Option<usize> {
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'));
    if canonical { digits.parse().ok() } else { None }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => f.write_str(NEXT_HANDLE),
            Self::Choice(index) => write!(f, "{CHOICE_PREFIX}{index}"),
            Self::Block(index) => write!(f, "{BLOCK_PREFIX}{index}"),
            Self::Visual(name) => f.write_str(name),
        }
    }
}

/// Semantic classification of a drawn edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// Default next pointer.
    Flow,
    /// Player choice pointer.
    Choice,
    /// Conditional block pointer.
    Condition,
    /// Cosmetic edge with no semantic pointer.
    Visual,
}

impl EdgeKind {
    /// Whether edges of this kind mirror a semantic pointer.
    #[must_use]
    pub fn is_semantic(self) -> bool {
        !matches!(self, Self::Visual)
    }

    /// The canvas edge type used to render this kind.
    #[must_use]
    pub fn visual_type(self) -> &'static str {
        match self {
            Self::Flow | Self::Visual => "default",
            Self::Choice => "choice",
            Self::Condition => "conditional",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absent_next_and_default_are_flow() {
        assert_eq!(Handle::parse(None), Handle::Next);
        assert_eq!(Handle::parse(Some("next")), Handle::Next);
        assert_eq!(Handle::parse(Some("default")), Handle::Next);
        assert_eq!(Handle::parse(Some("")), Handle::Next);
        assert_eq!(Handle::parse(None).kind(), EdgeKind::Flow);
    }

    #[test]
    fn test_parse_indexed_handles() {
        assert_eq!(Handle::parse(Some("choice-2")), Handle::Choice(2));
        assert_eq!(Handle::parse(Some("block-0")), Handle::Block(0));
        assert_eq!(Handle::parse(Some("choice-2")).kind(), EdgeKind::Choice);
        assert_eq!(Handle::parse(Some("block-0")).kind(), EdgeKind::Condition);
    }

    #[test]
    fn test_parse_unknown_or_malformed_is_visual() {
        assert_eq!(
            Handle::parse(Some("annotation")),
            Handle::Visual("annotation".to_owned())
        );
        assert_eq!(
            Handle::parse(Some("choice-x")),
            Handle::Visual("choice-x".to_owned())
        );
        assert!(!Handle::parse(Some("annotation")).kind().is_semantic());
    }

    #[test]
    fn test_parse_rejects_non_canonical_indices() {
        for raw in ["choice-01", "block-00", "choice-+1", "block-"] {
            assert_eq!(Handle::parse(Some(raw)), Handle::Visual(raw.to_owned()));
        }
        assert_eq!(Handle::parse(Some("choice-10")), Handle::Choice(10));
        assert_eq!(Handle::parse(Some("choice-10")).to_string(), "choice-10");
    }

    #[test]
    fn test_display_is_canonical_handle_name() {
        assert_eq!(Handle::Next.to_string(), "next");
        assert_eq!(Handle::Choice(1).to_string(), "choice-1");
        assert_eq!(Handle::Block(3).to_string(), "block-3");
    }

    #[test]
    fn test_edge_kind_serializes_screaming_case() {
        assert_eq!(
            serde_json::to_value(EdgeKind::Condition).unwrap(),
            serde_json::json!("CONDITION")
        );
    }
}
