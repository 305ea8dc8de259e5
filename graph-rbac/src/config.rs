//! Runtime configuration for the RBAC core.
//!
//! Traversal ceilings and scan limits are loaded from environment variables
//! with defaults matching the limits the graph queries were designed around.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// RBAC engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RbacConfig {
    /// Deepest level explored when enumerating descendants, deleting
    /// subtrees or listing reachable roles and permissions.
    pub max_traversal_depth: usize,

    /// Most Has edges collected for a single pair by `unassign`.
    pub unassign_scan_limit: usize,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            max_traversal_depth: 100_000,
            unassign_scan_limit: 100,
        }
    }
}

impl RbacConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RBAC_MAX_TRAVERSAL_DEPTH`: traversal ceiling (default: 100000)
    /// - `RBAC_UNASSIGN_SCAN_LIMIT`: edges scanned per unassign (default: 100)
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_traversal_depth: std::env::var("RBAC_MAX_TRAVERSAL_DEPTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_traversal_depth),
            unassign_scan_limit: std::env::var("RBAC_UNASSIGN_SCAN_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.unassign_scan_limit),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_traversal_depth == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RBAC_MAX_TRAVERSAL_DEPTH".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.unassign_scan_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RBAC_UNASSIGN_SCAN_LIMIT".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RbacConfig::default();
        assert_eq!(config.max_traversal_depth, 100_000);
        assert_eq!(config.unassign_scan_limit, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = RbacConfig {
            max_traversal_depth: 0,
            ..RbacConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "RBAC_MAX_TRAVERSAL_DEPTH"
        ));

        let config = RbacConfig {
            unassign_scan_limit: 0,
            ..RbacConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
