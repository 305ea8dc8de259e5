//! # Entities
//!
//! The three entity managers differ only in a handful of constants: which
//! collection they manage, which assignment edges they own and which
//! inheritance edges form their tree. Those constants live in an
//! [`EntityConfig`] attached to a marker type through the [`Entity`] trait,
//! so one generic manager serves all three kinds.

use graph_rbac_store::{Attributes, EdgeKind, Node, NodeId, NodeKind};
use serde::{Deserialize, Serialize};

/// Kind-specific constants for an entity manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityConfig {
    /// Collection managed.
    pub kind: NodeKind,
    /// Assignment edges used by `assign`, `unassign` and `reset_assignments`.
    pub has_edge: EdgeKind,
    /// Kind that holds this kind through an assignment edge, if any.
    pub owned_by: Option<NodeKind>,
    /// Kind this kind holds through an assignment edge, if any.
    pub owns: Option<NodeKind>,
    /// Inheritance edges forming this kind's tree.
    pub inherits_edge: EdgeKind,
}

impl EntityConfig {
    /// Owner and owned kinds of this manager's assignment edges.
    pub fn assignment_endpoints(&self) -> (NodeKind, NodeKind) {
        self.has_edge.endpoints()
    }

    /// Assignment edges leaving nodes of this kind.
    pub fn owns_edge(&self) -> Option<EdgeKind> {
        self.owns
            .and_then(|owned| EdgeKind::assignment(self.kind, owned))
    }

    /// Assignment edges entering nodes of this kind.
    pub fn owned_by_edge(&self) -> Option<EdgeKind> {
        self.owned_by
            .and_then(|owner| EdgeKind::assignment(owner, self.kind))
    }
}

/// Marker trait binding a type to its [`EntityConfig`].
pub trait Entity: Send + Sync + 'static {
    /// Constants for this kind.
    const CONFIG: EntityConfig;
}

/// Users: principals holding roles.
#[derive(Debug, Clone, Copy)]
pub struct User;

impl Entity for User {
    const CONFIG: EntityConfig = EntityConfig {
        kind: NodeKind::User,
        has_edge: EdgeKind::HasRole,
        owned_by: None,
        owns: Some(NodeKind::Role),
        inherits_edge: EdgeKind::InheritsUser,
    };
}

/// Roles: held by users, holding permissions.
#[derive(Debug, Clone, Copy)]
pub struct Role;

impl Entity for Role {
    const CONFIG: EntityConfig = EntityConfig {
        kind: NodeKind::Role,
        has_edge: EdgeKind::HasPermission,
        owned_by: Some(NodeKind::User),
        owns: Some(NodeKind::Permission),
        inherits_edge: EdgeKind::InheritsRole,
    };
}

/// Permissions: held by roles.
#[derive(Debug, Clone, Copy)]
pub struct Permission;

impl Entity for Permission {
    const CONFIG: EntityConfig = EntityConfig {
        kind: NodeKind::Permission,
        has_edge: EdgeKind::HasPermission,
        owned_by: Some(NodeKind::Role),
        owns: None,
        inherits_edge: EdgeKind::InheritsPermission,
    };
}

/// Title, description and id of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    /// Node id.
    pub id: NodeId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
}

impl From<Node> for NodeSummary {
    fn from(node: Node) -> Self {
        Self {
            id: node.id,
            title: node.title,
            description: node.description,
        }
    }
}

/// A node below another node, with its distance in edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descendant {
    /// Node id.
    pub id: NodeId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Inherits-edge count from the node the listing started at.
    pub depth: usize,
}

/// All descendants of a node.
///
/// Titles are intended unique within a kind, so lookups are by title; if
/// duplicates exist, the shallowest one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descendants(Vec<Descendant>);

impl Descendants {
    /// Wrap descendants, shallowest first.
    pub fn new(mut descendants: Vec<Descendant>) -> Self {
        descendants.sort_by_key(|d| d.depth);
        Self(descendants)
    }

    /// Find a descendant by title.
    pub fn get(&self, title: &str) -> Option<&Descendant> {
        self.0.iter().find(|d| d.title == title)
    }

    /// Iterate over descendants, shallowest first.
    pub fn iter(&self) -> impl Iterator<Item = &Descendant> {
        self.0.iter()
    }

    /// Number of descendants.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no descendants.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Descendants {
    type Item = Descendant;
    type IntoIter = std::vec::IntoIter<Descendant>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Partial update of an entity. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New path, with or without the root segment.
    pub path: Option<String>,
    /// Extra attributes to set.
    #[serde(default)]
    pub extra: Attributes,
}

impl EntityPatch {
    /// Patch changing only the description.
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Patch changing only the title.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_configs() {
        assert_eq!(User::CONFIG.owns_edge(), Some(EdgeKind::HasRole));
        assert_eq!(User::CONFIG.owned_by_edge(), None);

        assert_eq!(Role::CONFIG.owns_edge(), Some(EdgeKind::HasPermission));
        assert_eq!(Role::CONFIG.owned_by_edge(), Some(EdgeKind::HasRole));

        assert_eq!(Permission::CONFIG.owns_edge(), None);
        assert_eq!(Permission::CONFIG.owned_by_edge(), Some(EdgeKind::HasPermission));
    }

    #[test]
    fn test_inherits_edges_match_kinds() {
        for config in [User::CONFIG, Role::CONFIG, Permission::CONFIG] {
            assert_eq!(config.inherits_edge, config.kind.inherits_edge());
        }
    }

    #[test]
    fn test_roles_and_permissions_share_assignment_edges() {
        assert_eq!(Role::CONFIG.has_edge, Permission::CONFIG.has_edge);
        assert_eq!(
            Permission::CONFIG.assignment_endpoints(),
            (NodeKind::Role, NodeKind::Permission)
        );
        assert_eq!(
            User::CONFIG.assignment_endpoints(),
            (NodeKind::User, NodeKind::Role)
        );
    }

    #[test]
    fn test_descendants_lookup() {
        let d = |title: &str, depth| Descendant {
            id: NodeId::from(format!("Role/{}", title)),
            title: title.to_string(),
            description: String::new(),
            depth,
        };
        let descendants = Descendants::new(vec![d("b", 2), d("a", 1)]);
        assert_eq!(descendants.len(), 2);
        assert_eq!(descendants.iter().next().map(|x| x.depth), Some(1));
        assert_eq!(descendants.get("b").map(|x| x.depth), Some(2));
        assert!(descendants.get("c").is_none());
    }
}
