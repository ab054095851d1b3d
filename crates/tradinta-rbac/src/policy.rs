//! Access policy
//!
//! Owns the catalogue and registry a process authorizes against. Built once at
//! startup and shared (typically as `Arc<AccessPolicy>`) with every request
//! handler; it is never mutated afterwards.

use std::collections::BTreeSet;

use crate::catalog::PermissionCatalog;
use crate::error::RbacResult;
use crate::resolver::PermissionResolver;
use crate::restrictions::{restriction_toggles, ToggleGroup, UserRestrictions};
use crate::roles::RoleRegistry;

/// Immutable authorization configuration.
///
/// # Examples
///
/// ```
/// use tradinta_rbac::{AccessPolicy, UserRestrictions};
///
/// let policy = AccessPolicy::tradinta();
/// assert!(policy.has_permission("admin", "finance:manage:escrow"));
///
/// let restrictions = UserRestrictions::from_iter(["users:list"]);
/// let effective = policy.effective_permissions("support", &restrictions);
/// assert!(!effective.contains("users:list"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    catalog: PermissionCatalog,
    registry: RoleRegistry,
}

impl AccessPolicy {
    /// Create a policy without validating it.
    ///
    /// Resolution is well defined for any registry, including ones with
    /// cycles or dangling references; use [`validate`](Self::validate) to
    /// reject such configurations at startup.
    pub fn new(catalog: PermissionCatalog, registry: RoleRegistry) -> Self {
        Self { catalog, registry }
    }

    /// The production Tradinta policy.
    pub fn tradinta() -> Self {
        Self::new(PermissionCatalog::tradinta(), RoleRegistry::tradinta())
    }

    /// Check the catalogue and the registry against it.
    pub fn validate(&self) -> RbacResult<()> {
        self.catalog.validate()?;
        self.registry.validate(&self.catalog)
    }

    /// The permission catalogue.
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// The role registry.
    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    /// A resolver borrowing this policy.
    pub fn resolver(&self) -> PermissionResolver<'_> {
        PermissionResolver::new(&self.catalog, &self.registry)
    }

    /// See [`PermissionResolver::has_permission`].
    pub fn has_permission(&self, role_key: &str, permission: &str) -> bool {
        self.resolver().has_permission(role_key, permission)
    }

    /// See [`PermissionResolver::expand_role_permissions`].
    pub fn expand_role_permissions(&self, role_key: &str) -> BTreeSet<String> {
        self.resolver().expand_role_permissions(role_key)
    }

    /// See [`PermissionResolver::effective_permissions`].
    pub fn effective_permissions(
        &self,
        role_key: &str,
        restrictions: &UserRestrictions,
    ) -> BTreeSet<String> {
        self.resolver().effective_permissions(role_key, restrictions)
    }

    /// See [`restriction_toggles`].
    pub fn restriction_toggles(
        &self,
        role_key: &str,
        restrictions: &UserRestrictions,
    ) -> Vec<ToggleGroup> {
        restriction_toggles(&self.resolver(), role_key, restrictions)
    }
}
