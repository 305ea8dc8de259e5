//! # Graph RBAC
//!
//! Hierarchical role-based access control over a graph store.
//!
//! ## Overview
//!
//! Three entity kinds live in the graph:
//! - **Users**: principals, holding roles through `HasRole` edges
//! - **Roles**: holding permissions through `HasPermission` edges
//! - **Permissions**: the capabilities being checked
//!
//! Each kind is also a tree. Inherits edges point from a child to its parent
//! and every node caches its position as a `/root/...` path. Users and roles
//! inherit everything their ancestors hold; a permission grant also covers
//! every permission below it.
//!
//! ## Components
//!
//! - [`EntityIndex`]: resolves titles, paths and raw ids to node ids
//! - [`EntityManager`]: one generic manager per kind ([`Users`], [`Roles`],
//!   [`Permissions`]) covering the tree, assignments and lookups
//! - [`PermissionResolver`]: single-query reachability checks
//! - [`Rbac`]: the facade with `check`, `enforce` and `reset`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use graph_rbac::{Rbac, RbacConfig, RbacError};
//! use graph_rbac_store::MemoryGraphStore;
//!
//! async fn example() -> graph_rbac::RbacResult<()> {
//!     let rbac = Rbac::new(MemoryGraphStore::new(), RbacConfig::from_env())?;
//!
//!     rbac.roles().add_path("/administrator/editor", &["Admins", "Editors"]).await?;
//!     rbac.permissions().add_path("/articles/publish", &[]).await?;
//!     rbac.users().add_path("/alice", &[]).await?;
//!
//!     // Editors inherit everything administrators are granted
//!     rbac.assign("administrator", "articles").await?;
//!     rbac.users().assign("alice", "editor").await?;
//!
//!     // Holding "articles" covers "publish" below it
//!     assert!(rbac.check("publish", "alice").await?);
//!
//!     match rbac.enforce("billing", "alice").await {
//!         Err(RbacError::AccessDenied { permission }) => println!("denied: {}", permission),
//!         other => other?,
//!     }
//!     Ok(())
//! }
//! ```

mod assignment;
pub mod config;
pub mod entity;
pub mod error;
pub mod facade;
pub mod index;
pub mod manager;
pub mod path;
pub mod resolver;
mod tree;

// Re-export main types for convenience
pub use config::{ConfigError, RbacConfig};
pub use entity::{
    Descendant, Descendants, Entity, EntityConfig, EntityPatch, NodeSummary, Permission, Role,
    User,
};
pub use error::{RbacError, RbacResult};
pub use facade::{Rbac, ResetReport};
pub use index::EntityIndex;
pub use manager::{EntityManager, Permissions, Roles, Users};
pub use resolver::PermissionResolver;
