//! Error types for RBAC operations
//!
//! This module defines every error the RBAC core surfaces: reference
//! resolution failures, tree mutation failures, guarded bulk deletes and
//! denied enforcement checks.

use graph_rbac_store::{NodeId, NodeKind, StoreError};
use thiserror::Error;

use crate::config::ConfigError;

/// RBAC error types.
#[derive(Debug, Error)]
pub enum RbacError {
    /// Creating the inherits edge to the parent failed; the new node was
    /// rolled back
    #[error("Failed to attach new {kind} node to parent {parent}: {source}")]
    AttachToParentFailed {
        /// Kind of the node being added.
        kind: NodeKind,
        /// The intended parent.
        parent: NodeId,
        /// Why the edge could not be created.
        #[source]
        source: StoreError,
    },

    /// More than one node matched a title or path lookup
    #[error("Ambiguous {kind} reference '{reference}': matches {} and {}", .candidates[0], .candidates[1])]
    AmbiguousReference {
        /// Kind searched.
        kind: NodeKind,
        /// The reference as given.
        reference: String,
        /// The first two matching ids.
        candidates: [NodeId; 2],
    },

    /// Bulk delete invoked without confirmation
    #[error("Reset not confirmed: pass confirm = true to delete every {0}")]
    ResetNotConfirmed(&'static str),

    /// A required principal reference was absent or empty
    #[error("Principal not provided for {0}")]
    MissingPrincipal(&'static str),

    /// Enforced permission check failed
    #[error("Access denied: missing permission {permission}")]
    AccessDenied {
        /// The permission that was checked.
        permission: String,
    },

    /// A referenced node does not exist
    #[error("{kind} not found: {reference}")]
    NotFound {
        /// Kind searched.
        kind: NodeKind,
        /// The reference as given.
        reference: String,
    },

    /// Rejected engine configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Graph store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for RBAC operations.
pub type RbacResult<T> = Result<T, RbacError>;

impl RbacError {
    /// Check if this error originates from the store rather than the caller.
    ///
    /// Caller errors (ambiguous references, missing confirmation, denied
    /// access) are expected and should not be logged as errors.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            RbacError::Store(_) | RbacError::Config(_) | RbacError::AttachToParentFailed { .. }
        )
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            RbacError::AttachToParentFailed { .. } => "ATTACH_TO_PARENT_FAILED",
            RbacError::AmbiguousReference { .. } => "AMBIGUOUS_REFERENCE",
            RbacError::ResetNotConfirmed(_) => "RESET_NOT_CONFIRMED",
            RbacError::MissingPrincipal(_) => "MISSING_PRINCIPAL",
            RbacError::AccessDenied { .. } => "ACCESS_DENIED",
            RbacError::NotFound { .. } => "NOT_FOUND",
            RbacError::Config(_) => "CONFIG_ERROR",
            RbacError::Store(_) => "STORE_ERROR",
        }
    }
}
