//! # Assignment Graph
//!
//! Has edges record direct cross-kind grants: `HasRole` from a user to a
//! role and `HasPermission` from a role to a permission. Between any
//! ordered pair there is at most one Has edge.

use graph_rbac_store::{EdgeFilter, EdgeId, EdgeKind, GraphStore, NewEdge, NodeId};
use tracing::{debug, info, instrument, warn};

use crate::entity::{Entity, Permission, Role};
use crate::error::{RbacError, RbacResult};
use crate::manager::EntityManager;
use crate::resolver::require_principal;

/// One existing edge is enough to know the pair is assigned.
const EXISTENCE_LIMIT: usize = 2;

impl<S: GraphStore, E: Entity> EntityManager<S, E> {
    /// Assign `owned` to `owner` through this manager's Has edges.
    ///
    /// Both references are resolved within their own kinds (the owner kind
    /// and owned kind of the edge), falling back to literal ids.
    ///
    /// # Returns
    ///
    /// `true` when the edge was created, `false` when the pair was already
    /// assigned.
    pub async fn assign(&self, owner: &str, owned: &str) -> RbacResult<bool> {
        Ok(self.assign_edge(owner, owned).await?.is_some())
    }

    /// Like [`assign`](Self::assign), returning the id of the created edge.
    #[instrument(skip(self), fields(edge = %E::CONFIG.has_edge))]
    pub async fn assign_edge(&self, owner: &str, owned: &str) -> RbacResult<Option<EdgeId>> {
        require_principal(owner, "assign")?;
        let (owner, owned) = self.resolve_pair(owner, owned).await?;
        let kind = E::CONFIG.has_edge;

        let existing = self
            .store
            .find_edges(
                kind,
                &EdgeFilter::between(owner.clone(), owned.clone()),
                Some(EXISTENCE_LIMIT),
            )
            .await?;
        if !existing.is_empty() {
            debug!(owner = %owner, owned = %owned, "Already assigned");
            return Ok(None);
        }

        let id = self
            .store
            .create_edge(NewEdge::new(kind, owner.clone(), owned.clone()))
            .await?;
        info!(owner = %owner, owned = %owned, edge_id = %id, "Assigned");
        Ok(Some(id))
    }

    /// Remove the Has edge between `owner` and `owned`.
    ///
    /// Duplicate edges, should any exist, are all removed.
    ///
    /// # Returns
    ///
    /// Whether any edge was removed.
    #[instrument(skip(self), fields(edge = %E::CONFIG.has_edge))]
    pub async fn unassign(&self, owner: &str, owned: &str) -> RbacResult<bool> {
        require_principal(owner, "unassign")?;
        let (owner, owned) = self.resolve_pair(owner, owned).await?;
        let kind = E::CONFIG.has_edge;

        let edges = self
            .store
            .find_edges(
                kind,
                &EdgeFilter::between(owner.clone(), owned.clone()),
                Some(self.config.unassign_scan_limit),
            )
            .await?;
        for edge in &edges {
            self.store.remove_edge(kind, &edge.id).await?;
        }

        if edges.len() > 1 {
            warn!(owner = %owner, owned = %owned, count = edges.len(), "Removed duplicate assignments");
        }
        info!(owner = %owner, owned = %owned, removed = edges.len(), "Unassigned");
        Ok(!edges.is_empty())
    }

    /// Delete every Has edge of this manager's edge kind.
    ///
    /// Refuses to run unless `confirm` is `true`. Returns the number of
    /// edges removed.
    #[instrument(skip(self), fields(edge = %E::CONFIG.has_edge))]
    pub async fn reset_assignments(&self, confirm: bool) -> RbacResult<usize> {
        if !confirm {
            warn!("Refusing unconfirmed assignment reset");
            return Err(RbacError::ResetNotConfirmed(E::CONFIG.has_edge.as_str()));
        }

        let removed = self.store.remove_all_edges(E::CONFIG.has_edge).await?;
        info!(removed = removed.len(), "Reset assignments");
        Ok(removed.len())
    }

    /// Remove every Has edge touching `id`, in either direction.
    pub(crate) async fn detach_assignments(&self, id: &NodeId) -> RbacResult<usize> {
        let mut removed = 0;
        if E::CONFIG.owns_edge().is_some() {
            removed += self.unassign_owned(id).await?;
        }
        if E::CONFIG.owned_by_edge().is_some() {
            removed += self.unassign_owners(id).await?;
        }
        Ok(removed)
    }

    /// Remove every Has edge leaving `id`.
    async fn unassign_owned(&self, id: &NodeId) -> RbacResult<usize> {
        match E::CONFIG.owns_edge() {
            Some(kind) => self.remove_matching(kind, EdgeFilter::outgoing(id.clone())).await,
            None => Ok(0),
        }
    }

    /// Remove every Has edge entering `id`.
    async fn unassign_owners(&self, id: &NodeId) -> RbacResult<usize> {
        match E::CONFIG.owned_by_edge() {
            Some(kind) => self.remove_matching(kind, EdgeFilter::incoming(id.clone())).await,
            None => Ok(0),
        }
    }

    async fn remove_matching(&self, kind: EdgeKind, filter: EdgeFilter) -> RbacResult<usize> {
        let edges = self.store.find_edges(kind, &filter, None).await?;
        for edge in &edges {
            self.store.remove_edge(kind, &edge.id).await?;
        }
        Ok(edges.len())
    }

    async fn resolve_pair(&self, owner: &str, owned: &str) -> RbacResult<(NodeId, NodeId)> {
        let (owner_kind, owned_kind) = E::CONFIG.assignment_endpoints();
        // An empty reference would resolve to the root of the owned kind
        if owned.trim().is_empty() {
            return Err(RbacError::NotFound {
                kind: owned_kind,
                reference: owned.to_string(),
            });
        }
        let owner = self.index_of(owner_kind).resolve_or_literal(owner).await?;
        let owned = self.index_of(owned_kind).resolve_or_literal(owned).await?;
        Ok((owner, owned))
    }
}

impl<S: GraphStore> EntityManager<S, Role> {
    /// Remove every permission assigned directly to a role.
    ///
    /// The permissions themselves are kept. Returns the number of
    /// assignments removed.
    #[instrument(skip(self))]
    pub async fn unassign_permissions(&self, role: &str) -> RbacResult<usize> {
        require_principal(role, "unassign_permissions")?;
        let role = self.index().resolve_or_literal(role).await?;
        let removed = self.unassign_owned(&role).await?;
        info!(role = %role, removed, "Unassigned permissions from role");
        Ok(removed)
    }

    /// Remove the role from every user holding it directly.
    #[instrument(skip(self))]
    pub async fn unassign_users(&self, role: &str) -> RbacResult<usize> {
        require_principal(role, "unassign_users")?;
        let role = self.index().resolve_or_literal(role).await?;
        let removed = self.unassign_owners(&role).await?;
        info!(role = %role, removed, "Unassigned role from users");
        Ok(removed)
    }
}

impl<S: GraphStore> EntityManager<S, Permission> {
    /// Remove the permission from every role holding it directly.
    #[instrument(skip(self))]
    pub async fn unassign_roles(&self, permission: &str) -> RbacResult<usize> {
        require_principal(permission, "unassign_roles")?;
        let permission = self.index().resolve_or_literal(permission).await?;
        let removed = self.unassign_owners(&permission).await?;
        info!(permission = %permission, removed, "Unassigned permission from roles");
        Ok(removed)
    }
}
