//! # Permission Resolution
//!
//! Every check is one reachability query over a union of edge kinds, so a
//! grant is found whether it comes through the principal's hierarchy, the
//! target's hierarchy or both.
//!
//! Principals inherit upward: a role holds everything its ancestor roles
//! hold, and a user holds everything its ancestor users hold. Inherits edges
//! point from child to parent, so these are followed outbound. Permission
//! grants widen downward: holding a permission satisfies every permission
//! below it, so permission inherits edges are followed inbound.
//!
//! Lookups fail closed. A missing path is `false`; resolution errors such as
//! ambiguous references are returned as errors instead.

use graph_rbac_store::{EdgeKind, EdgeTraversal, GraphStore, NodeId, NodeKind, Traversal};
use tracing::{debug, instrument};

use crate::config::RbacConfig;
use crate::entity::{NodeSummary, Permission, Role, User};
use crate::error::{RbacError, RbacResult};
use crate::manager::EntityManager;

/// Edges leading from a role to the permissions it holds.
fn role_to_permission() -> Vec<EdgeTraversal> {
    vec![
        EdgeTraversal::outbound(EdgeKind::HasPermission),
        EdgeTraversal::outbound(EdgeKind::InheritsRole),
        EdgeTraversal::inbound(EdgeKind::InheritsPermission),
    ]
}

/// Edges leading from a user to the roles it holds.
fn user_to_role() -> Vec<EdgeTraversal> {
    vec![
        EdgeTraversal::outbound(EdgeKind::HasRole),
        EdgeTraversal::outbound(EdgeKind::InheritsUser),
        EdgeTraversal::outbound(EdgeKind::InheritsRole),
    ]
}

/// Edges leading from a user to the permissions it holds.
fn user_to_permission() -> Vec<EdgeTraversal> {
    vec![
        EdgeTraversal::outbound(EdgeKind::HasRole),
        EdgeTraversal::outbound(EdgeKind::HasPermission),
        EdgeTraversal::outbound(EdgeKind::InheritsUser),
        EdgeTraversal::outbound(EdgeKind::InheritsRole),
        EdgeTraversal::inbound(EdgeKind::InheritsPermission),
    ]
}

/// Edges leading from a permission back to the roles holding it.
fn permission_to_role() -> Vec<EdgeTraversal> {
    vec![
        EdgeTraversal::inbound(EdgeKind::HasPermission),
        EdgeTraversal::inbound(EdgeKind::InheritsRole),
        EdgeTraversal::outbound(EdgeKind::InheritsPermission),
    ]
}

/// Answers whether a principal holds a target, directly or transitively.
pub struct PermissionResolver<'a, S: ?Sized> {
    store: &'a S,
    config: &'a RbacConfig,
}

impl<'a, S: GraphStore + ?Sized> PermissionResolver<'a, S> {
    /// Create a resolver over `store`.
    pub fn new(store: &'a S, config: &'a RbacConfig) -> Self {
        Self { store, config }
    }

    /// Check whether a role holds a permission.
    pub async fn role_has_permission(&self, role: &NodeId, permission: &NodeId) -> RbacResult<bool> {
        self.reachable(role, permission, &role_to_permission()).await
    }

    /// Check whether a user holds a role.
    pub async fn user_has_role(&self, user: &NodeId, role: &NodeId) -> RbacResult<bool> {
        self.reachable(user, role, &user_to_role()).await
    }

    /// Check whether a user holds a permission.
    pub async fn user_has_permission(&self, user: &NodeId, permission: &NodeId) -> RbacResult<bool> {
        self.reachable(user, permission, &user_to_permission())
            .await
    }

    /// Every role a user holds.
    pub async fn roles_of_user(&self, user: &NodeId) -> RbacResult<Vec<NodeSummary>> {
        self.collect(user, user_to_role(), NodeKind::Role).await
    }

    /// Every permission a role holds.
    pub async fn permissions_of_role(&self, role: &NodeId) -> RbacResult<Vec<NodeSummary>> {
        self.collect(role, role_to_permission(), NodeKind::Permission)
            .await
    }

    /// Every role holding a permission.
    pub async fn roles_with_permission(&self, permission: &NodeId) -> RbacResult<Vec<NodeSummary>> {
        self.collect(permission, permission_to_role(), NodeKind::Role)
            .await
    }

    async fn reachable(
        &self,
        from: &NodeId,
        to: &NodeId,
        edges: &[EdgeTraversal],
    ) -> RbacResult<bool> {
        let path = self.store.shortest_path(from, to, edges).await?;
        debug!(
            from = %from,
            to = %to,
            hops = ?path.as_ref().map(|p| p.len().saturating_sub(1)),
            "Resolved reachability"
        );
        Ok(path.is_some())
    }

    async fn collect(
        &self,
        start: &NodeId,
        edges: Vec<EdgeTraversal>,
        kind: NodeKind,
    ) -> RbacResult<Vec<NodeSummary>> {
        let traversal = Traversal::new(start.clone(), edges, self.config.max_traversal_depth);
        let visits = self.store.traverse(&traversal).await?;
        Ok(visits
            .into_iter()
            .filter(|visit| visit.node.kind == kind)
            .map(|visit| NodeSummary::from(visit.node))
            .collect())
    }
}

/// Reject an empty principal reference before any lookup runs.
///
/// An empty reference normalizes to the root path, so resolving it would
/// silently select the root of the kind.
pub(crate) fn require_principal(reference: &str, operation: &'static str) -> RbacResult<()> {
    if reference.trim().is_empty() {
        return Err(RbacError::MissingPrincipal(operation));
    }
    Ok(())
}

impl<S: GraphStore, E> EntityManager<S, E> {
    /// Resolver sharing this manager's store and configuration.
    pub fn resolver(&self) -> PermissionResolver<'_, S> {
        PermissionResolver::new(self.store.as_ref(), self.config.as_ref())
    }
}

impl<S: GraphStore> EntityManager<S, User> {
    /// Check whether a user holds a role, directly, through an ancestor
    /// user, or through a descendant role that inherits it.
    ///
    /// # Errors
    ///
    /// [`RbacError::MissingPrincipal`] when `user` is empty.
    #[instrument(skip(self))]
    pub async fn has_role(&self, role: &str, user: &str) -> RbacResult<bool> {
        require_principal(user, "has_role")?;
        let user = self.index().resolve_or_literal(user).await?;
        let role = self
            .index_of(NodeKind::Role)
            .resolve_or_literal(role)
            .await?;
        self.resolver().user_has_role(&user, &role).await
    }

    /// Check whether a user holds a permission through any chain of
    /// assignments and inheritance.
    ///
    /// # Errors
    ///
    /// [`RbacError::MissingPrincipal`] when `user` is empty.
    #[instrument(skip(self))]
    pub async fn has_permission(&self, user: &str, permission: &str) -> RbacResult<bool> {
        require_principal(user, "has_permission")?;
        let user = self.index().resolve_or_literal(user).await?;
        let permission = self
            .index_of(NodeKind::Permission)
            .resolve_or_literal(permission)
            .await?;
        self.resolver()
            .user_has_permission(&user, &permission)
            .await
    }

    /// Every role a user holds, including inherited ones.
    #[instrument(skip(self))]
    pub async fn all_roles(&self, user: &str) -> RbacResult<Vec<NodeSummary>> {
        require_principal(user, "all_roles")?;
        let user = self.index().resolve_or_literal(user).await?;
        self.resolver().roles_of_user(&user).await
    }

    /// Number of roles a user holds, including inherited ones.
    pub async fn role_count(&self, user: &str) -> RbacResult<usize> {
        Ok(self.all_roles(user).await?.len())
    }
}

impl<S: GraphStore> EntityManager<S, Role> {
    /// Check whether a role holds a permission, directly, through an
    /// ancestor role, or through an ancestor of the permission.
    ///
    /// # Errors
    ///
    /// [`RbacError::MissingPrincipal`] when `role` is empty.
    #[instrument(skip(self))]
    pub async fn has_permission(&self, role: &str, permission: &str) -> RbacResult<bool> {
        require_principal(role, "has_permission")?;
        let role = self.index().resolve_or_literal(role).await?;
        let permission = self
            .index_of(NodeKind::Permission)
            .resolve_or_literal(permission)
            .await?;
        self.resolver()
            .role_has_permission(&role, &permission)
            .await
    }

    /// Every permission a role holds, including inherited ones.
    #[instrument(skip(self))]
    pub async fn permissions(&self, role: &str) -> RbacResult<Vec<NodeSummary>> {
        require_principal(role, "permissions")?;
        let role = self.index().resolve_or_literal(role).await?;
        self.resolver().permissions_of_role(&role).await
    }
}

impl<S: GraphStore> EntityManager<S, Permission> {
    /// Every role holding a permission, including through inheritance.
    #[instrument(skip(self))]
    pub async fn roles(&self, permission: &str) -> RbacResult<Vec<NodeSummary>> {
        let permission = self.index().resolve_or_literal(permission).await?;
        self.resolver().roles_with_permission(&permission).await
    }
}
