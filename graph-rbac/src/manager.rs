//! # Entity Manager
//!
//! [`EntityManager`] is the single generic manager behind [`Users`],
//! [`Roles`] and [`Permissions`]. The operations shared by every kind live
//! here; the hierarchy, assignment and resolution operations are split into
//! their own modules as further `impl` blocks.

use graph_rbac_store::{GraphStore, Node, NodeId, NodeKind, NodePatch, StoreError};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::RbacConfig;
use crate::entity::{Entity, EntityPatch, Permission, Role, User};
use crate::error::{RbacError, RbacResult};
use crate::index::EntityIndex;
use crate::path;

/// Manager for the nodes of one entity kind.
pub struct EntityManager<S, E> {
    pub(crate) store: Arc<S>,
    pub(crate) config: Arc<RbacConfig>,
    _entity: PhantomData<fn() -> E>,
}

/// Manager for users.
pub type Users<S> = EntityManager<S, User>;

/// Manager for roles.
pub type Roles<S> = EntityManager<S, Role>;

/// Manager for permissions.
pub type Permissions<S> = EntityManager<S, Permission>;

impl<S, E> Clone for EntityManager<S, E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
            _entity: PhantomData,
        }
    }
}

impl<S, E: Entity> std::fmt::Debug for EntityManager<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("kind", &E::CONFIG.kind)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: GraphStore, E: Entity> EntityManager<S, E> {
    /// Create a manager over `store`.
    pub fn new(store: Arc<S>, config: Arc<RbacConfig>) -> Self {
        Self {
            store,
            config,
            _entity: PhantomData,
        }
    }

    /// Kind of node managed.
    pub fn kind(&self) -> NodeKind {
        E::CONFIG.kind
    }

    /// Reference index over this manager's kind.
    pub fn index(&self) -> EntityIndex<'_, S> {
        EntityIndex::new(self.store.as_ref(), self.kind())
    }

    /// Reference index over another kind, for cross-kind operations.
    pub(crate) fn index_of(&self, kind: NodeKind) -> EntityIndex<'_, S> {
        EntityIndex::new(self.store.as_ref(), kind)
    }

    /// Resolve a title or path reference. See [`EntityIndex::return_id`].
    pub async fn return_id(&self, reference: &str) -> RbacResult<Option<NodeId>> {
        self.index().return_id(reference).await
    }

    /// Resolve a title. See [`EntityIndex::title_id`].
    pub async fn title_id(&self, title: &str) -> RbacResult<Option<NodeId>> {
        self.index().title_id(title).await
    }

    /// Resolve a path. See [`EntityIndex::path_id`].
    pub async fn path_id(&self, reference: &str) -> RbacResult<Option<NodeId>> {
        self.index().path_id(reference).await
    }

    /// Id of the root node, if the tree has one.
    pub async fn root_id(&self) -> RbacResult<Option<NodeId>> {
        self.index().root_id().await
    }

    /// Fetch a node, reporting a missing node as [`RbacError::NotFound`].
    pub async fn get(&self, id: &NodeId) -> RbacResult<Node> {
        self.store
            .get_node(self.kind(), id)
            .await
            .map_err(|err| match err {
                StoreError::NodeNotFound { kind, id } => RbacError::NotFound {
                    kind,
                    reference: id.to_string(),
                },
                other => RbacError::Store(other),
            })
    }

    /// Title of a node.
    pub async fn get_title(&self, id: &NodeId) -> RbacResult<String> {
        Ok(self.get(id).await?.title)
    }

    /// Description of a node.
    pub async fn get_description(&self, id: &NodeId) -> RbacResult<String> {
        Ok(self.get(id).await?.description)
    }

    /// Path of a node without the synthetic root segment; the root reads `/`.
    pub async fn get_path(&self, id: &NodeId) -> RbacResult<String> {
        Ok(path::strip_root(&self.get(id).await?.path))
    }

    /// Apply a partial update to a node.
    ///
    /// A supplied path is normalized so it carries the root segment exactly
    /// once. Moving a node in the tree is not done by editing its path; the
    /// inherits edges are left as they are.
    #[instrument(skip(self, patch), fields(kind = %self.kind()))]
    pub async fn edit(&self, id: &NodeId, patch: EntityPatch) -> RbacResult<()> {
        let patch = NodePatch {
            title: patch.title,
            description: patch.description,
            path: patch.path.as_deref().map(path::normalize),
            extra: patch.extra,
        };
        if patch.is_empty() {
            return Ok(());
        }

        self.store.update_node(self.kind(), id, patch).await?;
        info!(id = %id, "Edited node");
        Ok(())
    }

    /// Number of nodes of this kind.
    pub async fn count(&self) -> RbacResult<usize> {
        Ok(self.store.count_nodes(self.kind()).await?)
    }

    /// Delete every node of this kind together with its inherits edges and
    /// every Has edge touching the kind.
    ///
    /// Each Has edge kind connects exactly one pair of kinds, so clearing
    /// the kinds this manager owns or is owned through leaves no edge
    /// pointing at a deleted node. Refuses to run unless `confirm` is
    /// `true`, in which case nothing is touched. Returns the number of
    /// nodes removed.
    #[instrument(skip(self), fields(kind = %self.kind()))]
    pub async fn reset(&self, confirm: bool) -> RbacResult<usize> {
        if !confirm {
            warn!("Refusing unconfirmed reset");
            return Err(RbacError::ResetNotConfirmed(E::CONFIG.kind.as_str()));
        }

        let mut assignment_edges = 0;
        for kind in [E::CONFIG.owns_edge(), E::CONFIG.owned_by_edge()]
            .into_iter()
            .flatten()
        {
            assignment_edges += self.store.remove_all_edges(kind).await?.len();
        }
        let edges = self
            .store
            .remove_all_edges(E::CONFIG.inherits_edge)
            .await?;
        let nodes = self.store.remove_all_nodes(self.kind()).await?;

        info!(
            nodes = nodes.len(),
            inherits_edges = edges.len(),
            assignment_edges,
            "Reset entity tree"
        );
        Ok(nodes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_rbac_store::{EdgeKind, MemoryGraphStore, NewEdge, NewNode};

    fn roles(store: &Arc<MemoryGraphStore>) -> Roles<MemoryGraphStore> {
        Roles::new(Arc::clone(store), Arc::new(RbacConfig::default()))
    }

    #[tokio::test]
    async fn test_getters_strip_root() {
        let store = Arc::new(MemoryGraphStore::new());
        let id = store
            .create_node(NewNode::new(NodeKind::Role, "admin", "Administrators", "/root/admin/"))
            .await
            .unwrap();
        let roles = roles(&store);

        assert_eq!(roles.get_title(&id).await.unwrap(), "admin");
        assert_eq!(roles.get_description(&id).await.unwrap(), "Administrators");
        assert_eq!(roles.get_path(&id).await.unwrap(), "/admin/");
        assert_eq!(roles.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_node_is_not_found() {
        let store = Arc::new(MemoryGraphStore::new());
        let result = roles(&store).get(&NodeId::from("Role/missing")).await;

        assert!(matches!(result, Err(RbacError::NotFound { kind: NodeKind::Role, .. })));
    }

    #[tokio::test]
    async fn test_edit_normalizes_path() {
        let store = Arc::new(MemoryGraphStore::new());
        let id = store
            .create_node(NewNode::new(NodeKind::Role, "admin", "", "/root/admin/"))
            .await
            .unwrap();
        let roles = roles(&store);

        let patch = EntityPatch {
            description: Some("Admins".to_string()),
            path: Some("/staff/admin".to_string()),
            ..EntityPatch::default()
        };
        roles.edit(&id, patch).await.unwrap();

        let node = roles.get(&id).await.unwrap();
        assert_eq!(node.path, "/root/staff/admin/");
        assert_eq!(node.description, "Admins");
        assert_eq!(node.title, "admin");
    }

    #[tokio::test]
    async fn test_reset_requires_confirmation() {
        let store = Arc::new(MemoryGraphStore::new());
        store
            .create_node(NewNode::new(NodeKind::Role, "root", "root", "/root/"))
            .await
            .unwrap();
        let roles = roles(&store);

        let before = store.snapshot().await;
        assert!(matches!(
            roles.reset(false).await,
            Err(RbacError::ResetNotConfirmed("Role"))
        ));
        assert_eq!(store.snapshot().await, before);

        assert_eq!(roles.reset(true).await.unwrap(), 1);
        assert_eq!(roles.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reset_detaches_assignment_edges() {
        let store = Arc::new(MemoryGraphStore::new());
        let alice = store
            .create_node(NewNode::new(NodeKind::User, "alice", "", "/root/alice/"))
            .await
            .unwrap();
        let editor = store
            .create_node(NewNode::new(NodeKind::Role, "editor", "", "/root/editor/"))
            .await
            .unwrap();
        let publish = store
            .create_node(NewNode::new(NodeKind::Permission, "publish", "", "/root/publish/"))
            .await
            .unwrap();
        store
            .create_edge(NewEdge::new(EdgeKind::HasRole, alice.clone(), editor.clone()))
            .await
            .unwrap();
        store
            .create_edge(NewEdge::new(EdgeKind::HasPermission, editor, publish))
            .await
            .unwrap();

        assert_eq!(roles(&store).reset(true).await.unwrap(), 1);

        let snapshot = store.snapshot().await;
        assert!(snapshot.edges.is_empty(), "dangling edges: {:?}", snapshot.edges);
        assert_eq!(store.count_nodes(NodeKind::User).await.unwrap(), 1);
        assert_eq!(store.count_nodes(NodeKind::Permission).await.unwrap(), 1);
    }
}
