//! # Kinds
//!
//! The graph has a fixed shape: three node kinds and five edge kinds.
//! Every node kind owns one inheritance edge set, and two assignment edge
//! sets connect the kinds to each other.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node kinds stored in the graph.
///
/// Each kind forms its own hierarchy tree rooted at a synthetic root node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// Principals that hold roles.
    User,
    /// Named groupings of permissions.
    Role,
    /// Grantable capabilities.
    Permission,
}

impl NodeKind {
    /// Get the collection name for this kind (e.g., "Role").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Role => "Role",
            Self::Permission => "Permission",
        }
    }

    /// Parse from a collection name (case-insensitive).
    ///
    /// # Example
    ///
    /// ```
    /// use graph_rbac_store::NodeKind;
    ///
    /// assert_eq!(NodeKind::parse("role"), Some(NodeKind::Role));
    /// assert_eq!(NodeKind::parse("group"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Self::User),
            "role" => Some(Self::Role),
            "permission" => Some(Self::Permission),
            _ => None,
        }
    }

    /// The inheritance edge set of this kind.
    pub fn inherits_edge(&self) -> EdgeKind {
        match self {
            Self::User => EdgeKind::InheritsUser,
            Self::Role => EdgeKind::InheritsRole,
            Self::Permission => EdgeKind::InheritsPermission,
        }
    }

    /// Get all node kinds.
    pub fn all() -> Vec<Self> {
        vec![Self::User, Self::Role, Self::Permission]
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge kinds stored in the graph.
///
/// Inheritance edges point from a child to its parent, the reverse of the
/// intuitive parent-to-child direction: following an inherits edge outbound
/// walks up the tree, following it inbound walks down to the children.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {
    /// User holds Role.
    HasRole,
    /// Role holds Permission.
    HasPermission,
    /// User child to User parent.
    InheritsUser,
    /// Role child to Role parent.
    InheritsRole,
    /// Permission child to Permission parent.
    InheritsPermission,
}

impl EdgeKind {
    /// Get the collection name for this edge kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HasRole => "HasRole",
            Self::HasPermission => "HasPermission",
            Self::InheritsUser => "InheritsUser",
            Self::InheritsRole => "InheritsRole",
            Self::InheritsPermission => "InheritsPermission",
        }
    }

    /// Parse from a collection name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hasrole" => Some(Self::HasRole),
            "haspermission" => Some(Self::HasPermission),
            "inheritsuser" => Some(Self::InheritsUser),
            "inheritsrole" => Some(Self::InheritsRole),
            "inheritspermission" => Some(Self::InheritsPermission),
            _ => None,
        }
    }

    /// The `(from, to)` node kinds an edge of this kind connects.
    pub fn endpoints(&self) -> (NodeKind, NodeKind) {
        match self {
            Self::HasRole => (NodeKind::User, NodeKind::Role),
            Self::HasPermission => (NodeKind::Role, NodeKind::Permission),
            Self::InheritsUser => (NodeKind::User, NodeKind::User),
            Self::InheritsRole => (NodeKind::Role, NodeKind::Role),
            Self::InheritsPermission => (NodeKind::Permission, NodeKind::Permission),
        }
    }

    /// The assignment edge kind from `owner` to `owned`, if the graph has one.
    ///
    /// # Example
    ///
    /// ```
    /// use graph_rbac_store::{EdgeKind, NodeKind};
    ///
    /// assert_eq!(
    ///     EdgeKind::assignment(NodeKind::User, NodeKind::Role),
    ///     Some(EdgeKind::HasRole)
    /// );
    /// assert_eq!(EdgeKind::assignment(NodeKind::User, NodeKind::Permission), None);
    /// ```
    pub fn assignment(owner: NodeKind, owned: NodeKind) -> Option<Self> {
        match (owner, owned) {
            (NodeKind::User, NodeKind::Role) => Some(Self::HasRole),
            (NodeKind::Role, NodeKind::Permission) => Some(Self::HasPermission),
            _ => None,
        }
    }

    /// Check if this is an inheritance (tree) edge kind.
    pub fn is_inheritance(&self) -> bool {
        matches!(
            self,
            Self::InheritsUser | Self::InheritsRole | Self::InheritsPermission
        )
    }

    /// Get all edge kinds.
    pub fn all() -> Vec<Self> {
        vec![
            Self::HasRole,
            Self::HasPermission,
            Self::InheritsUser,
            Self::InheritsRole,
            Self::InheritsPermission,
        ]
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction in which an edge is followed during traversal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// From `from` to `to`.
    Outbound,
    /// From `to` back to `from`.
    Inbound,
}
