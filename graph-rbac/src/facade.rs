//! RBAC facade
//!
//! [`Rbac`] bundles the three entity managers over one store and exposes
//! the permission check used at enforcement points.

use graph_rbac_store::GraphStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::RbacConfig;
use crate::error::{RbacError, RbacResult};
use crate::manager::{Permissions, Roles, Users};

/// What a full reset removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetReport {
    /// Users removed.
    pub users: usize,
    /// Roles removed.
    pub roles: usize,
    /// Permissions removed.
    pub permissions: usize,
    /// `HasRole` edges removed.
    pub user_edges: usize,
    /// `HasPermission` edges removed.
    pub role_edges: usize,
    /// `HasPermission` edges removed by the permission manager. Roles and
    /// permissions share one edge kind, so this is normally `0`.
    pub permission_edges: usize,
}

/// The RBAC engine.
///
/// # Example
///
/// ```rust,no_run
/// use graph_rbac::{Rbac, RbacConfig};
/// use graph_rbac_store::MemoryGraphStore;
///
/// async fn example() -> graph_rbac::RbacResult<()> {
///     let rbac = Rbac::new(MemoryGraphStore::new(), RbacConfig::from_env())?;
///
///     rbac.permissions().add_path("/articles/search", &[]).await?;
///     rbac.roles().add_path("/editor", &["Editors"]).await?;
///     rbac.users().add_path("/alice", &[]).await?;
///
///     rbac.assign("editor", "search").await?;
///     rbac.users().assign("alice", "editor").await?;
///
///     rbac.enforce("search", "alice").await?;
///     Ok(())
/// }
/// ```
pub struct Rbac<S> {
    users: Users<S>,
    roles: Roles<S>,
    permissions: Permissions<S>,
}

impl<S> Clone for Rbac<S> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            roles: self.roles.clone(),
            permissions: self.permissions.clone(),
        }
    }
}

impl<S> std::fmt::Debug for Rbac<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rbac").finish_non_exhaustive()
    }
}

impl<S: GraphStore> Rbac<S> {
    /// Create an engine over `store`.
    ///
    /// # Errors
    ///
    /// [`RbacError::Config`] when `config` fails validation.
    pub fn new(store: S, config: RbacConfig) -> RbacResult<Self> {
        Self::from_shared(Arc::new(store), Arc::new(config))
    }

    /// Create an engine over a store that is shared with other components.
    pub fn from_shared(store: Arc<S>, config: Arc<RbacConfig>) -> RbacResult<Self> {
        config.validate()?;
        Ok(Self {
            users: Users::new(Arc::clone(&store), Arc::clone(&config)),
            roles: Roles::new(Arc::clone(&store), Arc::clone(&config)),
            permissions: Permissions::new(store, config),
        })
    }

    /// User manager.
    pub fn users(&self) -> &Users<S> {
        &self.users
    }

    /// Role manager.
    pub fn roles(&self) -> &Roles<S> {
        &self.roles
    }

    /// Permission manager.
    pub fn permissions(&self) -> &Permissions<S> {
        &self.permissions
    }

    /// Assign a permission to a role. See [`Roles::assign`].
    pub async fn assign(&self, role: &str, permission: &str) -> RbacResult<bool> {
        self.roles.assign(role, permission).await
    }

    /// Check whether a user holds a permission.
    ///
    /// # Errors
    ///
    /// [`RbacError::MissingPrincipal`] when `user` is empty, and any
    /// resolution or store error.
    #[instrument(skip(self))]
    pub async fn check(&self, permission: &str, user: &str) -> RbacResult<bool> {
        let granted = self.users.has_permission(user, permission).await?;
        debug!(granted, "Checked permission");
        Ok(granted)
    }

    /// Like [`check`](Self::check), failing with
    /// [`RbacError::AccessDenied`] instead of returning `false`.
    #[instrument(skip(self))]
    pub async fn enforce(&self, permission: &str, user: &str) -> RbacResult<()> {
        if self.check(permission, user).await? {
            return Ok(());
        }
        warn!("Access denied");
        Err(RbacError::AccessDenied {
            permission: permission.to_string(),
        })
    }

    /// Delete every node and edge of all three kinds.
    ///
    /// Refuses to run unless `confirm` is `true`, in which case nothing is
    /// touched. The individual resets are not atomic as a whole.
    #[instrument(skip(self))]
    pub async fn reset(&self, confirm: bool) -> RbacResult<ResetReport> {
        if !confirm {
            warn!("Refusing unconfirmed reset");
            return Err(RbacError::ResetNotConfirmed("entity and assignment"));
        }

        // Assignments first: the node resets clear Has edges too
        let user_edges = self.users.reset_assignments(true).await?;
        let role_edges = self.roles.reset_assignments(true).await?;
        let permission_edges = self.permissions.reset_assignments(true).await?;
        let report = ResetReport {
            users: self.users.reset(true).await?,
            roles: self.roles.reset(true).await?,
            permissions: self.permissions.reset(true).await?,
            user_edges,
            role_edges,
            permission_edges,
        };
        info!(?report, "Reset RBAC graph");
        Ok(report)
    }
}
