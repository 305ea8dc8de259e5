//! Graph store contract
//!
//! This module defines the capability contract the RBAC core requires from
//! a graph database: node CRUD, edge CRUD, filtered scans, bounded
//! traversals and shortest-path existence queries.

use async_trait::async_trait;
use thiserror::Error;

use crate::kinds::{EdgeKind, NodeKind};
use crate::model::{
    Edge, EdgeFilter, EdgeId, EdgePatch, EdgeTraversal, NewEdge, NewNode, Node, NodeFilter,
    NodeId, NodePatch, Traversal, Visit,
};

/// Graph store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No node with this id exists in the collection
    #[error("{kind} node not found: {id}")]
    NodeNotFound {
        /// Collection searched.
        kind: NodeKind,
        /// Requested id.
        id: NodeId,
    },

    /// No edge with this id exists in the collection
    #[error("{kind} edge not found: {id}")]
    EdgeNotFound {
        /// Collection searched.
        kind: EdgeKind,
        /// Requested id.
        id: EdgeId,
    },

    /// Edge endpoints are missing or of the wrong kind
    #[error("Invalid {kind} edge: {message}")]
    InvalidEdge {
        /// Collection written to.
        kind: EdgeKind,
        /// What was wrong with the endpoints.
        message: String,
    },

    /// Backend failure (connection, query execution, ...)
    #[error("Graph backend error: {0}")]
    Backend(String),
}

/// Result type for graph store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Graph store trait.
///
/// Every method is a single store operation. Implementations decide what
/// isolation, if any, they provide; callers must not assume that two calls
/// observe a consistent snapshot.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create a node and return its id.
    async fn create_node(&self, node: NewNode) -> StoreResult<NodeId>;

    /// Fetch a node by id.
    async fn get_node(&self, kind: NodeKind, id: &NodeId) -> StoreResult<Node>;

    /// Apply a partial update to a node.
    async fn update_node(&self, kind: NodeKind, id: &NodeId, patch: NodePatch) -> StoreResult<()>;

    /// Remove a node. Edges touching it are left alone.
    async fn remove_node(&self, kind: NodeKind, id: &NodeId) -> StoreResult<()>;

    /// Count nodes of a kind.
    async fn count_nodes(&self, kind: NodeKind) -> StoreResult<usize>;

    /// Scan nodes of a kind matching `filter`, returning at most `limit`.
    ///
    /// Result order is not significant.
    async fn find_nodes(
        &self,
        kind: NodeKind,
        filter: &NodeFilter,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Node>>;

    /// Remove every node of a kind, returning the removed nodes.
    async fn remove_all_nodes(&self, kind: NodeKind) -> StoreResult<Vec<Node>>;

    /// Create an edge and return its id.
    async fn create_edge(&self, edge: NewEdge) -> StoreResult<EdgeId>;

    /// Apply a partial update to an edge.
    async fn update_edge(&self, kind: EdgeKind, id: &EdgeId, patch: EdgePatch) -> StoreResult<()>;

    /// Remove an edge.
    async fn remove_edge(&self, kind: EdgeKind, id: &EdgeId) -> StoreResult<()>;

    /// Scan edges of a kind matching `filter`, returning at most `limit`.
    async fn find_edges(
        &self,
        kind: EdgeKind,
        filter: &EdgeFilter,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Edge>>;

    /// Remove every edge of a kind, returning the removed edges.
    async fn remove_all_edges(&self, kind: EdgeKind) -> StoreResult<Vec<Edge>>;

    /// Run a bounded-depth traversal.
    ///
    /// Each node is reported at most once, at the smallest depth it is
    /// reachable at, together with the edge it was first reached through.
    /// A missing start node yields an empty result.
    async fn traverse(&self, traversal: &Traversal) -> StoreResult<Vec<Visit>>;

    /// Find a shortest path from `from` to `to` over the union of `edges`.
    ///
    /// Returns the node ids along the path including both endpoints
    /// (a single id when `from == to`), or `None` when no path exists.
    async fn shortest_path(
        &self,
        from: &NodeId,
        to: &NodeId,
        edges: &[EdgeTraversal],
    ) -> StoreResult<Option<Vec<NodeId>>>;
}
