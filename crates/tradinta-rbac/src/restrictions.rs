//! # User Restrictions
//!
//! Per-user revocations layered over role grants.
//!
//! Restrictions are owned by the user-management store and handed in by the
//! caller. The effective permission set of a user is the expansion of their
//! role with every restricted permission removed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::PermissionCatalog;
use crate::resolver::PermissionResolver;

/// Permissions explicitly revoked for one user.
///
/// # Example
///
/// ```
/// use tradinta_rbac::UserRestrictions;
///
/// let mut restrictions = UserRestrictions::new();
/// restrictions.restrict("orders:refund");
/// assert!(restrictions.contains("orders:refund"));
///
/// let json = serde_json::to_string(&restrictions).unwrap();
/// assert_eq!(json, r#"["orders:refund"]"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRestrictions {
    permissions: BTreeSet<String>,
}

impl UserRestrictions {
    /// No restrictions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke a permission. Returns `false` if it was already revoked.
    pub fn restrict(&mut self, permission: impl Into<String>) -> bool {
        self.permissions.insert(permission.into())
    }

    /// Lift a revocation. Returns `false` if it was not revoked.
    pub fn lift(&mut self, permission: &str) -> bool {
        self.permissions.remove(permission)
    }

    /// Check if a permission is revoked.
    pub fn contains(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Iterate revoked permissions in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }

    /// Number of revoked permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Remove every restricted permission from `granted`.
    pub fn apply(&self, mut granted: BTreeSet<String>) -> BTreeSet<String> {
        granted.retain(|p| !self.permissions.contains(p));
        granted
    }

    /// Revoked entries that no longer name a catalogued permission.
    ///
    /// These are left behind when a permission is renamed or removed.
    pub fn stale<'a>(&'a self, catalog: &PermissionCatalog) -> Vec<&'a str> {
        self.iter().filter(|p| !catalog.contains(p)).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for UserRestrictions {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            permissions: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// One permission row in a restriction editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionToggle {
    /// Permission string
    pub permission: String,
    /// Whether the user currently has it revoked
    pub restricted: bool,
}

/// A catalogue group narrowed to what a role grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleGroup {
    /// Resource segment
    pub resource: String,
    /// Group heading
    pub label: String,
    /// Rows in catalogue order
    pub toggles: Vec<PermissionToggle>,
}

/// Build the restriction editor for a user holding `role_key`.
///
/// Only permissions the role actually grants are offered, in catalogue order;
/// groups the role grants nothing in are left out. Each row records whether
/// the user currently has it revoked.
pub fn restriction_toggles(
    resolver: &PermissionResolver<'_>,
    role_key: &str,
    restrictions: &UserRestrictions,
) -> Vec<ToggleGroup> {
    let granted = resolver.expand_role_permissions(role_key);

    resolver
        .catalog()
        .groups()
        .iter()
        .filter_map(|group| {
            let toggles: Vec<PermissionToggle> = group
                .permissions
                .iter()
                .filter(|p| granted.contains(*p))
                .map(|p| PermissionToggle {
                    permission: p.clone(),
                    restricted: restrictions.contains(p),
                })
                .collect();

            (!toggles.is_empty()).then(|| ToggleGroup {
                resource: group.resource.clone(),
                label: group.label.clone(),
                toggles,
            })
        })
        .collect()
}
