//! # Hierarchy Tree
//!
//! Each kind forms a tree of inherits edges. Edges run from a child to its
//! parent, so a node's parent is its single *outbound* neighbour and its
//! children are its *inbound* neighbours. Do not flip this: the permission
//! resolver walks principals upward by following these edges outbound.
//!
//! None of the multi-step mutations here are atomic. `add` deletes the node
//! it created when attaching it to its parent fails; `add_path` and `remove`
//! do not compensate and may leave a partially updated tree if the store
//! fails halfway.

use graph_rbac_store::{
    Attributes, EdgeFilter, EdgePatch, EdgeTraversal, GraphStore, NewEdge, NewNode, NodeId,
    NodePatch, Traversal, Visit,
};
use tracing::{debug, error, info, instrument};

use crate::entity::{Descendant, Descendants, Entity, EntityPatch, NodeSummary};
use crate::error::{RbacError, RbacResult};
use crate::manager::EntityManager;
use crate::path::{self, ROOT_PATH, ROOT_TITLE};

impl<S: GraphStore, E: Entity> EntityManager<S, E> {
    /// Add a node under a parent.
    ///
    /// # Arguments
    ///
    /// * `title` - Title, intended unique within the kind
    /// * `description` - Free-form description
    /// * `parent` - Title, path or id of the parent. `None` places the node
    ///   under the root, or makes it the root when the tree is empty.
    /// * `extra` - Additional attributes stored on the node
    ///
    /// # Returns
    ///
    /// The id of the new node. If the edge to the parent cannot be created
    /// the node is deleted again and [`RbacError::AttachToParentFailed`] is
    /// returned.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use graph_rbac::{Rbac, RbacConfig};
    /// use graph_rbac_store::{Attributes, MemoryGraphStore};
    ///
    /// async fn example() -> graph_rbac::RbacResult<()> {
    ///     let rbac = Rbac::new(MemoryGraphStore::new(), RbacConfig::default())?;
    ///     rbac.roles().add("root", "root", None, Attributes::new()).await?;
    ///     rbac.roles().add("admin", "Administrators", Some("root"), Attributes::new()).await?;
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self, extra), fields(kind = %self.kind()))]
    pub async fn add(
        &self,
        title: &str,
        description: &str,
        parent: Option<&str>,
        extra: Attributes,
    ) -> RbacResult<NodeId> {
        let parent = match parent {
            Some(reference) => {
                let id = self.index().resolve_or_literal(reference).await?;
                let node = self.get(&id).await.map_err(|err| match err {
                    RbacError::NotFound { kind, .. } => RbacError::NotFound {
                        kind,
                        reference: reference.to_string(),
                    },
                    other => other,
                })?;
                Some(node)
            }
            None => match self.root_id().await? {
                Some(root) => Some(self.get(&root).await?),
                None => None,
            },
        };

        let node_path = match &parent {
            Some(parent) => path::child(&parent.path, title),
            None => ROOT_PATH.to_string(),
        };
        let id = self
            .store
            .create_node(
                NewNode::new(self.kind(), title, description, node_path.as_str()).with_extra(extra),
            )
            .await?;

        let Some(parent) = parent else {
            info!(id = %id, "Added root node");
            return Ok(id);
        };

        let edge = NewEdge::new(E::CONFIG.inherits_edge, id.clone(), parent.id.clone());
        if let Err(source) = self.store.create_edge(edge).await {
            if let Err(rollback) = self.store.remove_node(self.kind(), &id).await {
                error!(
                    id = %id,
                    error = %rollback,
                    "Failed to roll back node after parent attach failure"
                );
            }
            return Err(RbacError::AttachToParentFailed {
                kind: self.kind(),
                parent: parent.id,
                source,
            });
        }

        info!(id = %id, parent = %parent.id, path = %node_path, "Added node");
        Ok(id)
    }

    /// Ensure every segment of a path exists, creating the missing ones.
    ///
    /// Segments are looked up by title. A missing segment is created under
    /// the previous one with `descriptions[i]` as description (or the
    /// segment title when none is given); an existing segment has its path
    /// rewritten to the walked path and its description replaced only when
    /// one is supplied. The root is created on demand.
    ///
    /// # Returns
    ///
    /// The number of segments created. The root never counts, so calling
    /// this twice with the same path returns `0` the second time.
    #[instrument(skip(self, descriptions), fields(kind = %self.kind()))]
    pub async fn add_path(&self, reference: &str, descriptions: &[&str]) -> RbacResult<usize> {
        let mut parent = match self.root_id().await? {
            Some(root) => root,
            None => {
                self.add(ROOT_TITLE, ROOT_TITLE, None, Attributes::new())
                    .await?
            }
        };
        let mut current_path = ROOT_PATH.to_string();
        let mut created = 0;

        for (position, segment) in path::segments(reference).into_iter().enumerate() {
            current_path = path::child(&current_path, segment);
            let description = descriptions.get(position).copied();

            parent = match self.title_id(segment).await? {
                Some(existing) => {
                    let patch = EntityPatch {
                        description: description.map(str::to_string),
                        path: Some(current_path.clone()),
                        ..EntityPatch::default()
                    };
                    self.edit(&existing, patch).await?;
                    existing
                }
                None => {
                    created += 1;
                    self.add(
                        segment,
                        description.unwrap_or(segment),
                        Some(parent.as_str()),
                        Attributes::new(),
                    )
                    .await?
                }
            };
        }

        info!(path = %current_path, created, "Ensured path");
        Ok(created)
    }

    /// Remove a node.
    ///
    /// With `recursive`, the node and every descendant are deleted. Without
    /// it, only the node goes: its children are re-linked to its parent and
    /// the paths below it lose the removed segment. Removing the root
    /// non-recursively leaves its children as orphans with their paths
    /// unchanged. Assignment edges touching removed nodes are detached.
    ///
    /// Returns the number of nodes deleted.
    #[instrument(skip(self), fields(kind = %self.kind()))]
    pub async fn remove(&self, id: &NodeId, recursive: bool) -> RbacResult<usize> {
        let node = self.get(id).await?;

        if recursive {
            let mut doomed = vec![node.id.clone()];
            doomed.extend(
                self.store
                    .traverse(&self.subtree(id, self.config.max_traversal_depth))
                    .await?
                    .into_iter()
                    .map(|visit| visit.node.id),
            );

            for doomed_id in &doomed {
                self.delete_node(doomed_id).await?;
            }
            info!(id = %id, removed = doomed.len(), "Removed subtree");
            return Ok(doomed.len());
        }

        let parent = self.parent_node(id).await?;
        let below = self
            .store
            .traverse(&self.subtree(id, self.config.max_traversal_depth))
            .await?;
        let child_edges = self
            .store
            .find_edges(E::CONFIG.inherits_edge, &EdgeFilter::incoming(id.clone()), None)
            .await?;

        match &parent {
            Some(parent) => {
                for edge in &child_edges {
                    self.store
                        .update_edge(edge.kind, &edge.id, EdgePatch::retarget(parent.id.clone()))
                        .await?;
                }
                let parent_path = self.get(&parent.id).await?.path;
                self.rebase_paths(&below, &node.path, &parent_path).await?;
            }
            None => {
                for edge in &child_edges {
                    self.store.remove_edge(edge.kind, &edge.id).await?;
                }
            }
        }

        self.delete_node(id).await?;
        info!(
            id = %id,
            relinked = child_edges.len(),
            orphaned = parent.is_none(),
            "Removed node"
        );
        Ok(1)
    }

    /// Direct children of a node.
    pub async fn children(&self, id: &NodeId) -> RbacResult<Vec<NodeSummary>> {
        let visits = self.store.traverse(&self.subtree(id, 1)).await?;
        Ok(visits
            .into_iter()
            .map(|visit| NodeSummary::from(visit.node))
            .collect())
    }

    /// Every node below `id`, annotated with its distance from `id`.
    pub async fn descendants(&self, id: &NodeId) -> RbacResult<Descendants> {
        let visits = self
            .store
            .traverse(&self.subtree(id, self.config.max_traversal_depth))
            .await?;
        debug!(id = %id, found = visits.len(), "Listed descendants");

        Ok(Descendants::new(
            visits
                .into_iter()
                .map(|visit| Descendant {
                    id: visit.node.id,
                    title: visit.node.title,
                    description: visit.node.description,
                    depth: visit.depth,
                })
                .collect(),
        ))
    }

    /// Edge count from the root to `id`.
    ///
    /// The root has depth `0`. `None` when there is no root or `id` is not
    /// connected to it.
    pub async fn depth(&self, id: &NodeId) -> RbacResult<Option<usize>> {
        let Some(root) = self.root_id().await? else {
            return Ok(None);
        };
        let path = self
            .store
            .shortest_path(
                id,
                &root,
                &[EdgeTraversal::outbound(E::CONFIG.inherits_edge)],
            )
            .await?;
        Ok(path.map(|nodes| nodes.len().saturating_sub(1)))
    }

    /// Parent of a node, or `None` for the root and orphans.
    pub async fn parent_node(&self, id: &NodeId) -> RbacResult<Option<NodeSummary>> {
        let traversal = Traversal::new(
            id.clone(),
            vec![EdgeTraversal::outbound(E::CONFIG.inherits_edge)],
            1,
        );
        let visits = self.store.traverse(&traversal).await?;
        Ok(visits.into_iter().next().map(|visit| NodeSummary::from(visit.node)))
    }

    fn subtree(&self, id: &NodeId, max_depth: usize) -> Traversal {
        Traversal::new(
            id.clone(),
            vec![EdgeTraversal::inbound(E::CONFIG.inherits_edge)],
            max_depth,
        )
    }

    async fn rebase_paths(
        &self,
        nodes: &[Visit],
        old_prefix: &str,
        new_prefix: &str,
    ) -> RbacResult<()> {
        for visit in nodes {
            let Some(rebased) = path::rebase(&visit.node.path, old_prefix, new_prefix) else {
                continue;
            };
            let patch = NodePatch {
                path: Some(rebased),
                ..NodePatch::default()
            };
            self.store
                .update_node(self.kind(), &visit.node.id, patch)
                .await?;
        }
        Ok(())
    }

    /// Delete a node with its edge to its parent and its assignment edges.
    async fn delete_node(&self, id: &NodeId) -> RbacResult<()> {
        let upward = self
            .store
            .find_edges(E::CONFIG.inherits_edge, &EdgeFilter::outgoing(id.clone()), None)
            .await?;
        for edge in upward {
            self.store.remove_edge(edge.kind, &edge.id).await?;
        }

        self.detach_assignments(id).await?;
        self.store.remove_node(self.kind(), id).await?;
        Ok(())
    }
}
