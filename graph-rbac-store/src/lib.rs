//! # Graph RBAC Store
//!
//! This crate defines the graph store contract used by `graph-rbac`,
//! together with the graph data model and an in-memory backend.
//!
//! ## Overview
//!
//! The graph has a fixed shape:
//! - **Nodes**: `User`, `Role` and `Permission` collections
//! - **Inheritance edges**: `InheritsUser`, `InheritsRole`, `InheritsPermission`,
//!   one tree per node kind, pointing from child to parent
//! - **Assignment edges**: `HasRole` (User → Role) and `HasPermission`
//!   (Role → Permission)
//!
//! ## Capabilities
//!
//! The [`GraphStore`] trait covers:
//! - Node CRUD and counting
//! - Edge CRUD
//! - Filtered scans with result limits
//! - Bounded-depth traversals over a union of edge kinds
//! - Shortest-path existence queries
//!
//! ## Features
//!
//! - `memory` (default): [`MemoryGraphStore`], an in-memory backend for
//!   single-process applications and tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use graph_rbac_store::{EdgeKind, GraphStore, MemoryGraphStore, NewEdge, NewNode, NodeKind};
//!
//! async fn example() -> graph_rbac_store::StoreResult<()> {
//!     let store = MemoryGraphStore::new();
//!
//!     let root = store
//!         .create_node(NewNode::new(NodeKind::Role, "root", "root", "/root/"))
//!         .await?;
//!     let admin = store
//!         .create_node(NewNode::new(NodeKind::Role, "admin", "Administrators", "/root/admin/"))
//!         .await?;
//!
//!     // Child points at parent
//!     store
//!         .create_edge(NewEdge::new(EdgeKind::InheritsRole, admin, root))
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod kinds;
#[cfg(feature = "memory")]
pub mod memory;
pub mod model;
pub mod store;

// Re-export main types for convenience
pub use kinds::{Direction, EdgeKind, NodeKind};
#[cfg(feature = "memory")]
pub use memory::{GraphSnapshot, MemoryGraphStore};
pub use model::{
    Attributes, Edge, EdgeFilter, EdgeId, EdgePatch, EdgeTraversal, NewEdge, NewNode, Node,
    NodeFilter, NodeId, NodePatch, Traversal, Visit,
};
pub use store::{GraphStore, StoreError, StoreResult};
