//! Access configuration loading.
//!
//! The catalogue and registry ship compiled in. Deployments may replace them
//! with a JSON document of the same shape, loaded once at startup:
//!
//! ```json
//! {
//!   "catalog": [
//!     { "resource": "users", "label": "Users", "permissions": ["users:list"] }
//!   ],
//!   "roles": {
//!     "super-admin": { "name": "Super Admin", "permissions": ["*"] },
//!     "support": { "name": "Support", "permissions": ["users:list"] }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::env::VarError;
use std::path::Path;
use tracing::{info, warn};

use crate::catalog::{PermissionCatalog, PermissionGroup};
use crate::error::{RbacError, RbacResult};
use crate::policy::AccessPolicy;
use crate::roles::RoleRegistry;

/// Environment variable naming a JSON access configuration file.
pub const CONFIG_PATH_ENV: &str = "TRADINTA_RBAC_CONFIG";

/// Serializable access configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbacConfig {
    /// Permission groups in presentation order.
    pub catalog: Vec<PermissionGroup>,

    /// Roles keyed by role key.
    pub roles: RoleRegistry,
}

impl Default for RbacConfig {
    /// Returns the built-in Tradinta catalogue and roles.
    fn default() -> Self {
        Self {
            catalog: PermissionCatalog::tradinta().groups().to_vec(),
            roles: RoleRegistry::tradinta(),
        }
    }
}

impl RbacConfig {
    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> RbacResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.catalog.is_empty() {
            return Err(RbacError::Config("catalog must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> RbacResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Load configuration from the environment.
    ///
    /// Environment variables:
    /// - `TRADINTA_RBAC_CONFIG`: path to a JSON configuration file
    ///   (default: built-in Tradinta configuration)
    ///
    /// A set but non-unicode value is an error rather than a silent fallback.
    pub fn from_env() -> RbacResult<Self> {
        Self::from_var(std::env::var(CONFIG_PATH_ENV))
    }

    fn from_var(value: Result<String, VarError>) -> RbacResult<Self> {
        match value {
            Ok(path) if !path.trim().is_empty() => {
                info!(path = %path, "loading access configuration from file");
                Self::from_path(path.trim())
            }
            Ok(_) | Err(VarError::NotPresent) => Ok(Self::default()),
            Err(VarError::NotUnicode(raw)) => {
                warn!(
                    var = CONFIG_PATH_ENV,
                    value = ?raw,
                    "configuration path is not valid unicode"
                );
                Err(RbacError::Config(format!("{CONFIG_PATH_ENV} is not valid unicode")))
            }
        }
    }

    /// Validate and turn the configuration into an [`AccessPolicy`].
    pub fn into_policy(self) -> RbacResult<AccessPolicy> {
        let policy = AccessPolicy::new(PermissionCatalog::new(self.catalog), self.roles);

        if let Err(err) = policy.validate() {
            warn!(error = %err, code = err.error_code(), "rejecting access configuration");
            return Err(err);
        }

        info!(
            roles = policy.registry().len(),
            permissions = policy.catalog().len(),
            "access policy loaded"
        );
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    const SMALL_CONFIG: &str = r#"{
        "catalog": [
            { "resource": "users", "label": "Users", "permissions": ["users:list", "users:update:role"] },
            { "resource": "finance", "label": "Finance", "permissions": ["finance:manage:escrow"] }
        ],
        "roles": {
            "super-admin": { "name": "Super Admin", "permissions": ["*"] },
            "support": { "name": "Support", "permissions": ["users:list"] },
            "user-management": {
                "name": "User Management",
                "permissions": ["users:update:role"],
                "inherits": ["support"]
            }
        }
    }"#;

    #[test]
    fn test_default_config_is_valid() {
        let policy = RbacConfig::default().into_policy().unwrap();
        assert!(policy.has_permission("admin", "finance:manage:escrow"));
    }

    #[test]
    fn test_from_json_str() {
        let policy = RbacConfig::from_json_str(SMALL_CONFIG)
            .unwrap()
            .into_policy()
            .unwrap();

        assert_eq!(policy.catalog().len(), 3);
        assert!(policy.has_permission("user-management", "users:list"));
        assert!(!policy.has_permission("support", "users:update:role"));
        assert_eq!(
            policy.expand_role_permissions("super-admin").len(),
            policy.catalog().len()
        );
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let result = RbacConfig::from_json_str(r#"{ "catalog": [], "roles": {} }"#);
        assert!(matches!(result, Err(RbacError::Config(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result = RbacConfig::from_json_str(r#"{ "catalog": "#);
        assert!(matches!(result, Err(RbacError::Parse(_))));
    }

    #[test]
    fn test_inconsistent_config_rejected() {
        let json = r#"{
            "catalog": [{ "resource": "users", "label": "Users", "permissions": ["users:list"] }],
            "roles": { "support": { "name": "Support", "permissions": ["orders:view"] } }
        }"#;
        let result = RbacConfig::from_json_str(json).unwrap().into_policy();
        assert!(matches!(result, Err(RbacError::InvalidRegistry { .. })));
    }

    #[test]
    fn test_from_path() {
        let path = std::env::temp_dir().join(format!(
            "tradinta-rbac-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, SMALL_CONFIG).unwrap();

        let config = RbacConfig::from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.roles.len(), 3);

        let missing = RbacConfig::from_path(&path);
        assert!(matches!(missing, Err(RbacError::Io(_))));
    }

    #[test]
    fn test_env_value_handling() {
        let config = RbacConfig::from_var(Err(VarError::NotPresent)).unwrap();
        assert_eq!(config.roles.len(), RoleRegistry::tradinta().len());

        let config = RbacConfig::from_var(Ok("   ".to_string())).unwrap();
        assert_eq!(config.roles.len(), RoleRegistry::tradinta().len());

        let err = RbacConfig::from_var(Err(VarError::NotUnicode(OsString::from("x")))).unwrap_err();
        assert!(matches!(err, RbacError::Config(_)));
        assert!(err.to_string().contains(CONFIG_PATH_ENV));

        let err = RbacConfig::from_var(Ok("/nonexistent/tradinta-rbac.json".to_string()))
            .unwrap_err();
        assert!(matches!(err, RbacError::Io(_)));
    }
}
