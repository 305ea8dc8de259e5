//! # Graph Model
//!
//! Nodes, edges, filters and traversal descriptions exchanged with a
//! [`GraphStore`](crate::GraphStore).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::kinds::{Direction, EdgeKind, NodeKind};

/// Opaque attribute bag attached to nodes and edges.
pub type Attributes = Map<String, Value>;

/// Store-assigned node identifier.
///
/// Identifiers are unique across the whole graph, not just within one kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Store-assigned edge identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored entity node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Store-assigned identifier.
    pub id: NodeId,
    /// Kind of entity.
    pub kind: NodeKind,
    /// Human-facing title, intended unique within the kind.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Slash-delimited position in the kind's tree, prefixed by `/root/`.
    pub path: String,
    /// Kind-specific attributes supplied at creation.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Attributes,
    /// When the node was created.
    pub created_at: DateTime<Utc>,
    /// When the node was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Attributes for a node about to be created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewNode {
    /// Kind of entity.
    pub kind: NodeKind,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Fully qualified path.
    pub path: String,
    /// Extra attributes.
    #[serde(default)]
    pub extra: Attributes,
}

impl NewNode {
    /// Create node attributes without extras.
    pub fn new(
        kind: NodeKind,
        title: impl Into<String>,
        description: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            path: path.into(),
            extra: Attributes::new(),
        }
    }

    /// Attach extra attributes.
    pub fn with_extra(mut self, extra: Attributes) -> Self {
        self.extra = extra;
        self
    }
}

/// Partial update of a node. `None` fields are left untouched and `extra`
/// entries are merged key by key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodePatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New path.
    pub path: Option<String>,
    /// Attributes to set.
    #[serde(default)]
    pub extra: Attributes,
}

impl NodePatch {
    /// Check if applying the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.path.is_none()
            && self.extra.is_empty()
    }
}

/// A stored directed edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    /// Store-assigned identifier.
    pub id: EdgeId,
    /// Edge collection.
    pub kind: EdgeKind,
    /// Source node.
    pub from: NodeId,
    /// Target node.
    pub to: NodeId,
    /// Edge attributes.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Attributes,
    /// When the edge was created.
    pub created_at: DateTime<Utc>,
}

/// An edge about to be created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEdge {
    /// Edge collection.
    pub kind: EdgeKind,
    /// Source node.
    pub from: NodeId,
    /// Target node.
    pub to: NodeId,
    /// Edge attributes.
    #[serde(default)]
    pub attributes: Attributes,
}

impl NewEdge {
    /// Create an edge without attributes.
    pub fn new(kind: EdgeKind, from: NodeId, to: NodeId) -> Self {
        Self {
            kind,
            from,
            to,
            attributes: Attributes::new(),
        }
    }
}

/// Partial update of an edge, used to re-point inheritance edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EdgePatch {
    /// New source node.
    pub from: Option<NodeId>,
    /// New target node.
    pub to: Option<NodeId>,
    /// Attributes to set.
    #[serde(default)]
    pub attributes: Attributes,
}

impl EdgePatch {
    /// Patch that re-points the edge at a new target.
    pub fn retarget(to: NodeId) -> Self {
        Self {
            to: Some(to),
            ..Self::default()
        }
    }
}

/// Equality filter over node fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeFilter {
    /// Every node of the kind.
    All,
    /// `title == value`.
    Title(String),
    /// `path == value`.
    Path(String),
    /// `title == title OR path == path`, evaluated in one pass.
    TitleOrPath {
        /// Title to match.
        title: String,
        /// Path to match.
        path: String,
    },
}

impl NodeFilter {
    /// Check whether a node satisfies the filter.
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Self::All => true,
            Self::Title(title) => node.title == *title,
            Self::Path(path) => node.path == *path,
            Self::TitleOrPath { title, path } => node.title == *title || node.path == *path,
        }
    }
}

/// Equality filter over edge endpoints. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeFilter {
    /// Required source.
    pub from: Option<NodeId>,
    /// Required target.
    pub to: Option<NodeId>,
}

impl EdgeFilter {
    /// Edges leaving `from`.
    pub fn outgoing(from: NodeId) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    /// Edges entering `to`.
    pub fn incoming(to: NodeId) -> Self {
        Self {
            from: None,
            to: Some(to),
        }
    }

    /// Edges between an ordered pair.
    pub fn between(from: NodeId, to: NodeId) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Check whether an edge satisfies the filter.
    pub fn matches(&self, edge: &Edge) -> bool {
        self.from.as_ref().map_or(true, |from| edge.from == *from)
            && self.to.as_ref().map_or(true, |to| edge.to == *to)
    }
}

/// One edge kind followed in a given direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EdgeTraversal {
    /// Edge collection to follow.
    pub kind: EdgeKind,
    /// Direction to follow it in.
    pub direction: Direction,
}

impl EdgeTraversal {
    /// Follow `kind` from source to target.
    pub fn outbound(kind: EdgeKind) -> Self {
        Self {
            kind,
            direction: Direction::Outbound,
        }
    }

    /// Follow `kind` from target back to source.
    pub fn inbound(kind: EdgeKind) -> Self {
        Self {
            kind,
            direction: Direction::Inbound,
        }
    }
}

/// A bounded-depth traversal over a union of edge kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    /// Start node.
    pub start: NodeId,
    /// Edge kinds (with direction) that may be followed at every step.
    pub edges: Vec<EdgeTraversal>,
    /// Smallest depth to report. Depth 0 reports the start node itself.
    pub min_depth: usize,
    /// Largest depth to explore.
    pub max_depth: usize,
}

impl Traversal {
    /// Traverse from `start` over `edges`, reporting depths `1..=max_depth`.
    pub fn new(start: NodeId, edges: Vec<EdgeTraversal>, max_depth: usize) -> Self {
        Self {
            start,
            edges,
            min_depth: 1,
            max_depth,
        }
    }

    /// Change the smallest reported depth.
    pub fn with_min_depth(mut self, min_depth: usize) -> Self {
        self.min_depth = min_depth;
        self
    }
}

/// A node reached by a traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    /// The node reached.
    pub node: Node,
    /// The edge the node was reached through (`None` for the start node).
    pub edge: Option<Edge>,
    /// Edge count from the start node.
    pub depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(title: &str, path: &str) -> Node {
        Node {
            id: NodeId::from("Role/1"),
            kind: NodeKind::Role,
            title: title.to_string(),
            description: String::new(),
            path: path.to_string(),
            extra: Attributes::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_node_filter_matches() {
        let admin = node("admin", "/root/admin/");

        assert!(NodeFilter::All.matches(&admin));
        assert!(NodeFilter::Title("admin".into()).matches(&admin));
        assert!(!NodeFilter::Title("editor".into()).matches(&admin));
        assert!(NodeFilter::Path("/root/admin/".into()).matches(&admin));
        assert!(NodeFilter::TitleOrPath {
            title: "other".into(),
            path: "/root/admin/".into(),
        }
        .matches(&admin));
        assert!(!NodeFilter::TitleOrPath {
            title: "other".into(),
            path: "/root/other/".into(),
        }
        .matches(&admin));
    }

    #[test]
    fn test_edge_filter_matches() {
        let edge = Edge {
            id: EdgeId::new("HasRole/1"),
            kind: EdgeKind::HasRole,
            from: NodeId::from("User/1"),
            to: NodeId::from("Role/1"),
            attributes: Attributes::new(),
            created_at: Utc::now(),
        };

        assert!(EdgeFilter::default().matches(&edge));
        assert!(EdgeFilter::outgoing(NodeId::from("User/1")).matches(&edge));
        assert!(EdgeFilter::incoming(NodeId::from("Role/1")).matches(&edge));
        assert!(!EdgeFilter::between(NodeId::from("User/1"), NodeId::from("Role/2")).matches(&edge));
    }

    #[test]
    fn test_node_patch_is_empty() {
        assert!(NodePatch::default().is_empty());
        let patch = NodePatch {
            description: Some("updated".into()),
            ..NodePatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_node_id_serializes_transparently() {
        let id = NodeId::from("Permission/abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"Permission/abc\"");
        assert_eq!(id.to_string(), "Permission/abc");
    }
}
