//! In-memory graph store
//!
//! A [`GraphStore`] backed by hash maps behind a single async lock.
//! This is suitable for single-process applications and testing.
//! Production deployments plug in a driver for a real graph database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::kinds::{Direction, EdgeKind, NodeKind};
use crate::model::{
    Edge, EdgeFilter, EdgeId, EdgePatch, EdgeTraversal, NewEdge, NewNode, Node, NodeFilter,
    NodeId, NodePatch, Traversal, Visit,
};
use crate::store::{GraphStore, StoreError, StoreResult};

/// Point-in-time copy of every node and edge, ordered by id.
///
/// Two snapshots compare equal exactly when the store held the same data.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSnapshot {
    /// All nodes, ordered by id.
    pub nodes: Vec<Node>,
    /// All edges, ordered by kind then id.
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    /// Check if the store held nothing.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[derive(Default)]
struct GraphState {
    nodes: HashMap<NodeId, Node>,
    edges: HashMap<EdgeKind, HashMap<EdgeId, Edge>>,
}

impl GraphState {
    fn node_of_kind(&self, kind: NodeKind, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id).filter(|node| node.kind == kind)
    }

    fn check_endpoint(&self, kind: EdgeKind, id: &NodeId, expected: NodeKind) -> StoreResult<()> {
        match self.nodes.get(id) {
            Some(node) if node.kind == expected => Ok(()),
            Some(node) => Err(StoreError::InvalidEdge {
                kind,
                message: format!("{} is a {}, expected a {}", id, node.kind, expected),
            }),
            None => Err(StoreError::InvalidEdge {
                kind,
                message: format!("endpoint {} does not exist", id),
            }),
        }
    }

    /// Edges usable from `id` under `edges`, paired with the node they lead to.
    fn neighbours(&self, id: &NodeId, edges: &[EdgeTraversal]) -> Vec<(&Edge, &NodeId)> {
        let mut found = Vec::new();
        for step in edges {
            let Some(collection) = self.edges.get(&step.kind) else {
                continue;
            };
            for edge in collection.values() {
                match step.direction {
                    Direction::Outbound if edge.from == *id => found.push((edge, &edge.to)),
                    Direction::Inbound if edge.to == *id => found.push((edge, &edge.from)),
                    _ => {}
                }
            }
        }
        // Stable expansion order keeps traversal results reproducible
        found.sort_by(|a, b| (a.0.created_at, &a.0.id).cmp(&(b.0.created_at, &b.0.id)));
        found
    }
}

/// In-memory graph store implementation.
#[derive(Clone, Default)]
pub struct MemoryGraphStore {
    state: Arc<RwLock<GraphState>>,
}

impl std::fmt::Debug for MemoryGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryGraphStore").finish_non_exhaustive()
    }
}

impl MemoryGraphStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the whole store content.
    pub async fn snapshot(&self) -> GraphSnapshot {
        let state = self.state.read().await;

        let mut nodes: Vec<Node> = state.nodes.values().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut edges: Vec<Edge> = state
            .edges
            .values()
            .flat_map(|collection| collection.values().cloned())
            .collect();
        edges.sort_by(|a, b| (a.kind, &a.id).cmp(&(b.kind, &b.id)));

        GraphSnapshot { nodes, edges }
    }

    fn node_key(kind: NodeKind) -> NodeId {
        NodeId::new(format!("{}/{}", kind.as_str(), Uuid::now_v7().simple()))
    }

    fn edge_key(kind: EdgeKind) -> EdgeId {
        EdgeId::new(format!("{}/{}", kind.as_str(), Uuid::now_v7().simple()))
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn create_node(&self, node: NewNode) -> StoreResult<NodeId> {
        let id = Self::node_key(node.kind);
        let now = Utc::now();

        let mut state = self.state.write().await;
        state.nodes.insert(
            id.clone(),
            Node {
                id: id.clone(),
                kind: node.kind,
                title: node.title,
                description: node.description,
                path: node.path,
                extra: node.extra,
                created_at: now,
                updated_at: now,
            },
        );

        Ok(id)
    }

    async fn get_node(&self, kind: NodeKind, id: &NodeId) -> StoreResult<Node> {
        let state = self.state.read().await;
        state
            .node_of_kind(kind, id)
            .cloned()
            .ok_or_else(|| StoreError::NodeNotFound {
                kind,
                id: id.clone(),
            })
    }

    async fn update_node(&self, kind: NodeKind, id: &NodeId, patch: NodePatch) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let node = state
            .nodes
            .get_mut(id)
            .filter(|node| node.kind == kind)
            .ok_or_else(|| StoreError::NodeNotFound {
                kind,
                id: id.clone(),
            })?;

        if let Some(title) = patch.title {
            node.title = title;
        }
        if let Some(description) = patch.description {
            node.description = description;
        }
        if let Some(path) = patch.path {
            node.path = path;
        }
        node.extra.extend(patch.extra);
        node.updated_at = Utc::now();

        Ok(())
    }

    async fn remove_node(&self, kind: NodeKind, id: &NodeId) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.node_of_kind(kind, id).is_none() {
            return Err(StoreError::NodeNotFound {
                kind,
                id: id.clone(),
            });
        }
        state.nodes.remove(id);
        Ok(())
    }

    async fn count_nodes(&self, kind: NodeKind) -> StoreResult<usize> {
        let state = self.state.read().await;
        Ok(state.nodes.values().filter(|node| node.kind == kind).count())
    }

    async fn find_nodes(
        &self,
        kind: NodeKind,
        filter: &NodeFilter,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Node>> {
        let state = self.state.read().await;
        let mut found: Vec<Node> = state
            .nodes
            .values()
            .filter(|node| node.kind == kind && filter.matches(node))
            .cloned()
            .collect();
        found.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        if let Some(limit) = limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn remove_all_nodes(&self, kind: NodeKind) -> StoreResult<Vec<Node>> {
        let mut state = self.state.write().await;
        let ids: Vec<NodeId> = state
            .nodes
            .values()
            .filter(|node| node.kind == kind)
            .map(|node| node.id.clone())
            .collect();

        let removed: Vec<Node> = ids
            .iter()
            .filter_map(|id| state.nodes.remove(id))
            .collect();

        tracing::debug!(kind = %kind, removed = removed.len(), "Removed all nodes");
        Ok(removed)
    }

    async fn create_edge(&self, edge: NewEdge) -> StoreResult<EdgeId> {
        let mut state = self.state.write().await;

        let (from_kind, to_kind) = edge.kind.endpoints();
        state.check_endpoint(edge.kind, &edge.from, from_kind)?;
        state.check_endpoint(edge.kind, &edge.to, to_kind)?;

        let id = Self::edge_key(edge.kind);
        state.edges.entry(edge.kind).or_default().insert(
            id.clone(),
            Edge {
                id: id.clone(),
                kind: edge.kind,
                from: edge.from,
                to: edge.to,
                attributes: edge.attributes,
                created_at: Utc::now(),
            },
        );

        Ok(id)
    }

    async fn update_edge(&self, kind: EdgeKind, id: &EdgeId, patch: EdgePatch) -> StoreResult<()> {
        let mut state = self.state.write().await;

        let (from_kind, to_kind) = kind.endpoints();
        if let Some(from) = &patch.from {
            state.check_endpoint(kind, from, from_kind)?;
        }
        if let Some(to) = &patch.to {
            state.check_endpoint(kind, to, to_kind)?;
        }

        let edge = state
            .edges
            .get_mut(&kind)
            .and_then(|collection| collection.get_mut(id))
            .ok_or_else(|| StoreError::EdgeNotFound {
                kind,
                id: id.clone(),
            })?;

        if let Some(from) = patch.from {
            edge.from = from;
        }
        if let Some(to) = patch.to {
            edge.to = to;
        }
        edge.attributes.extend(patch.attributes);

        Ok(())
    }

    async fn remove_edge(&self, kind: EdgeKind, id: &EdgeId) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state
            .edges
            .get_mut(&kind)
            .and_then(|collection| collection.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::EdgeNotFound {
                kind,
                id: id.clone(),
            })
    }

    async fn find_edges(
        &self,
        kind: EdgeKind,
        filter: &EdgeFilter,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Edge>> {
        let state = self.state.read().await;
        let mut found: Vec<Edge> = state
            .edges
            .get(&kind)
            .map(|collection| {
                collection
                    .values()
                    .filter(|edge| filter.matches(edge))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        found.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        if let Some(limit) = limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn remove_all_edges(&self, kind: EdgeKind) -> StoreResult<Vec<Edge>> {
        let mut state = self.state.write().await;
        let removed: Vec<Edge> = state
            .edges
            .remove(&kind)
            .map(|collection| collection.into_values().collect())
            .unwrap_or_default();

        tracing::debug!(kind = %kind, removed = removed.len(), "Removed all edges");
        Ok(removed)
    }

    async fn traverse(&self, traversal: &Traversal) -> StoreResult<Vec<Visit>> {
        let state = self.state.read().await;
        let Some(start) = state.nodes.get(&traversal.start) else {
            return Ok(Vec::new());
        };

        let mut visits = Vec::new();
        if traversal.min_depth == 0 {
            visits.push(Visit {
                node: start.clone(),
                edge: None,
                depth: 0,
            });
        }

        let mut visited: HashSet<NodeId> = HashSet::from([start.id.clone()]);
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::from([(start.id.clone(), 0)]);

        while let Some((id, depth)) = queue.pop_front() {
            if depth >= traversal.max_depth {
                continue;
            }
            for (edge, next) in state.neighbours(&id, &traversal.edges) {
                if !visited.insert(next.clone()) {
                    continue;
                }
                // Edges may outlive their endpoints
                let Some(node) = state.nodes.get(next) else {
                    continue;
                };
                let next_depth = depth + 1;
                if next_depth >= traversal.min_depth {
                    visits.push(Visit {
                        node: node.clone(),
                        edge: Some(edge.clone()),
                        depth: next_depth,
                    });
                }
                queue.push_back((next.clone(), next_depth));
            }
        }

        Ok(visits)
    }

    async fn shortest_path(
        &self,
        from: &NodeId,
        to: &NodeId,
        edges: &[EdgeTraversal],
    ) -> StoreResult<Option<Vec<NodeId>>> {
        let state = self.state.read().await;
        if !state.nodes.contains_key(from) || !state.nodes.contains_key(to) {
            return Ok(None);
        }
        if from == to {
            return Ok(Some(vec![from.clone()]));
        }

        let mut previous: HashMap<NodeId, NodeId> = HashMap::new();
        let mut visited: HashSet<NodeId> = HashSet::from([from.clone()]);
        let mut queue: VecDeque<NodeId> = VecDeque::from([from.clone()]);

        while let Some(id) = queue.pop_front() {
            for (_, next) in state.neighbours(&id, edges) {
                if !state.nodes.contains_key(next) || !visited.insert(next.clone()) {
                    continue;
                }
                previous.insert(next.clone(), id.clone());
                if next == to {
                    let mut path = vec![to.clone()];
                    let mut cursor = to;
                    while let Some(prior) = previous.get(cursor) {
                        path.push(prior.clone());
                        cursor = prior;
                    }
                    path.reverse();
                    return Ok(Some(path));
                }
                queue.push_back(next.clone());
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn role(store: &MemoryGraphStore, title: &str, path: &str) -> NodeId {
        store
            .create_node(NewNode::new(NodeKind::Role, title, title, path))
            .await
            .unwrap()
    }

    /// root <- a <- b, root <- c
    async fn sample_tree(store: &MemoryGraphStore) -> (NodeId, NodeId, NodeId, NodeId) {
        let root = role(store, "root", "/root/").await;
        let a = role(store, "a", "/root/a/").await;
        let b = role(store, "b", "/root/a/b/").await;
        let c = role(store, "c", "/root/c/").await;
        for (child, parent) in [(&a, &root), (&b, &a), (&c, &root)] {
            store
                .create_edge(NewEdge::new(
                    EdgeKind::InheritsRole,
                    child.clone(),
                    parent.clone(),
                ))
                .await
                .unwrap();
        }
        (root, a, b, c)
    }

    #[tokio::test]
    async fn test_node_crud() {
        let store = MemoryGraphStore::new();
        let id = role(&store, "admin", "/root/admin/").await;
        assert!(id.as_str().starts_with("Role/"));

        let node = store.get_node(NodeKind::Role, &id).await.unwrap();
        assert_eq!(node.title, "admin");

        store
            .update_node(
                NodeKind::Role,
                &id,
                NodePatch {
                    description: Some("Administrators".into()),
                    ..NodePatch::default()
                },
            )
            .await
            .unwrap();
        let node = store.get_node(NodeKind::Role, &id).await.unwrap();
        assert_eq!(node.description, "Administrators");
        assert_eq!(node.title, "admin");

        // Lookups are scoped to the kind
        assert!(matches!(
            store.get_node(NodeKind::User, &id).await,
            Err(StoreError::NodeNotFound { .. })
        ));

        assert_eq!(store.count_nodes(NodeKind::Role).await.unwrap(), 1);
        store.remove_node(NodeKind::Role, &id).await.unwrap();
        assert_eq!(store.count_nodes(NodeKind::Role).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_nodes_with_limit() {
        let store = MemoryGraphStore::new();
        role(&store, "dup", "/root/dup/").await;
        role(&store, "dup", "/root/x/dup/").await;
        role(&store, "dup", "/root/y/dup/").await;

        let all = store
            .find_nodes(NodeKind::Role, &NodeFilter::Title("dup".into()), None)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let limited = store
            .find_nodes(NodeKind::Role, &NodeFilter::Title("dup".into()), Some(2))
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_create_edge_validates_endpoints() {
        let store = MemoryGraphStore::new();
        let r = role(&store, "r", "/root/r/").await;
        let u = store
            .create_node(NewNode::new(NodeKind::User, "u", "u", "/root/u/"))
            .await
            .unwrap();

        let wrong_kind = store
            .create_edge(NewEdge::new(EdgeKind::HasPermission, r.clone(), u.clone()))
            .await;
        assert!(matches!(wrong_kind, Err(StoreError::InvalidEdge { .. })));

        let missing = store
            .create_edge(NewEdge::new(EdgeKind::HasRole, u.clone(), NodeId::from("Role/nope")))
            .await;
        assert!(matches!(missing, Err(StoreError::InvalidEdge { .. })));

        assert!(store
            .create_edge(NewEdge::new(EdgeKind::HasRole, u, r))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_traverse_inbound_reports_depth_and_edge() {
        let store = MemoryGraphStore::new();
        let (root, a, b, c) = sample_tree(&store).await;

        let visits = store
            .traverse(&Traversal::new(
                root.clone(),
                vec![EdgeTraversal::inbound(EdgeKind::InheritsRole)],
                100,
            ))
            .await
            .unwrap();

        let depth_of = |id: &NodeId| visits.iter().find(|v| v.node.id == *id).map(|v| v.depth);
        assert_eq!(visits.len(), 3);
        assert_eq!(depth_of(&a), Some(1));
        assert_eq!(depth_of(&c), Some(1));
        assert_eq!(depth_of(&b), Some(2));

        let b_visit = visits.iter().find(|v| v.node.id == b).unwrap();
        assert_eq!(b_visit.edge.as_ref().unwrap().to, a);

        let shallow = store
            .traverse(&Traversal::new(
                root,
                vec![EdgeTraversal::inbound(EdgeKind::InheritsRole)],
                1,
            ))
            .await
            .unwrap();
        assert_eq!(shallow.len(), 2);
    }

    #[tokio::test]
    async fn test_traverse_outbound_and_min_depth() {
        let store = MemoryGraphStore::new();
        let (root, a, b, _) = sample_tree(&store).await;

        let visits = store
            .traverse(
                &Traversal::new(
                    b.clone(),
                    vec![EdgeTraversal::outbound(EdgeKind::InheritsRole)],
                    10,
                )
                .with_min_depth(0),
            )
            .await
            .unwrap();
        let ids: Vec<&NodeId> = visits.iter().map(|v| &v.node.id).collect();
        assert_eq!(ids, vec![&b, &a, &root]);
        assert!(visits[0].edge.is_none());
    }

    #[tokio::test]
    async fn test_traverse_missing_start() {
        let store = MemoryGraphStore::new();
        let visits = store
            .traverse(&Traversal::new(
                NodeId::from("Role/missing"),
                vec![EdgeTraversal::inbound(EdgeKind::InheritsRole)],
                10,
            ))
            .await
            .unwrap();
        assert!(visits.is_empty());
    }

    #[tokio::test]
    async fn test_shortest_path() {
        let store = MemoryGraphStore::new();
        let (root, a, b, c) = sample_tree(&store).await;
        let down = [EdgeTraversal::inbound(EdgeKind::InheritsRole)];

        let path = store.shortest_path(&root, &b, &down).await.unwrap();
        assert_eq!(path, Some(vec![root.clone(), a.clone(), b.clone()]));

        assert_eq!(
            store.shortest_path(&b, &b, &down).await.unwrap(),
            Some(vec![b.clone()])
        );
        // Wrong direction
        assert_eq!(store.shortest_path(&b, &root, &down).await.unwrap(), None);
        // Siblings are not connected downward
        assert_eq!(store.shortest_path(&a, &c, &down).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_edge_retarget() {
        let store = MemoryGraphStore::new();
        let (root, a, b, _) = sample_tree(&store).await;

        let edge = store
            .find_edges(
                EdgeKind::InheritsRole,
                &EdgeFilter::between(b.clone(), a.clone()),
                None,
            )
            .await
            .unwrap()
            .remove(0);
        store
            .update_edge(EdgeKind::InheritsRole, &edge.id, EdgePatch::retarget(root.clone()))
            .await
            .unwrap();

        let moved = store
            .find_edges(EdgeKind::InheritsRole, &EdgeFilter::outgoing(b), None)
            .await
            .unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].to, root);
    }

    #[tokio::test]
    async fn test_remove_all_and_snapshot() {
        let store = MemoryGraphStore::new();
        sample_tree(&store).await;

        let before = store.snapshot().await;
        assert_eq!(before.nodes.len(), 4);
        assert_eq!(before.edges.len(), 3);
        assert_eq!(store.snapshot().await, before);

        let edges = store.remove_all_edges(EdgeKind::InheritsRole).await.unwrap();
        assert_eq!(edges.len(), 3);
        let nodes = store.remove_all_nodes(NodeKind::Role).await.unwrap();
        assert_eq!(nodes.len(), 4);
        assert!(store.snapshot().await.is_empty());
    }
}
