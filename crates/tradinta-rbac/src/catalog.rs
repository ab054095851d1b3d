//! # Permission Catalogue
//!
//! Every permission string the marketplace recognises, grouped by resource
//! for the admin screens that toggle individual permissions per user.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{RbacError, RbacResult};
use crate::permissions::Permission;

/// Permissions on one resource, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGroup {
    /// Resource segment shared by every permission in the group.
    pub resource: String,
    /// Human-readable heading.
    pub label: String,
    /// Permission strings.
    pub permissions: Vec<String>,
}

impl PermissionGroup {
    /// Create a group from static permission strings.
    pub fn new(resource: impl Into<String>, label: impl Into<String>, permissions: &[&str]) -> Self {
        Self {
            resource: resource.into(),
            label: label.into(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// The full set of recognised permissions.
///
/// # Example
///
/// ```
/// use tradinta_rbac::PermissionCatalog;
///
/// let catalog = PermissionCatalog::tradinta();
/// assert!(catalog.contains("orders:update:status"));
/// assert!(!catalog.contains("*"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionCatalog {
    groups: Vec<PermissionGroup>,
    index: BTreeSet<String>,
}

impl PermissionCatalog {
    /// Build a catalogue from groups.
    pub fn new(groups: Vec<PermissionGroup>) -> Self {
        let index = groups
            .iter()
            .flat_map(|g| g.permissions.iter().cloned())
            .collect();
        Self { groups, index }
    }

    /// The production Tradinta catalogue.
    pub fn tradinta() -> Self {
        Self::new(vec![
            PermissionGroup::new(
                "users",
                "Users",
                &[
                    "users:list",
                    "users:view",
                    "users:create",
                    "users:update",
                    "users:update:role",
                    "users:update:restrictions",
                    "users:suspend",
                    "users:delete",
                ],
            ),
            PermissionGroup::new(
                "sellers",
                "Sellers",
                &["sellers:list", "sellers:verify", "sellers:suspend"],
            ),
            PermissionGroup::new(
                "products",
                "Products",
                &[
                    "products:list",
                    "products:create",
                    "products:update",
                    "products:delete",
                    "products:approve",
                    "products:feature",
                ],
            ),
            PermissionGroup::new(
                "orders",
                "Orders",
                &[
                    "orders:list",
                    "orders:view",
                    "orders:create",
                    "orders:update:status",
                    "orders:cancel",
                    "orders:refund",
                ],
            ),
            PermissionGroup::new(
                "finance",
                "Finance",
                &[
                    "finance:view:reports",
                    "finance:view:transactions",
                    "finance:manage:escrow",
                    "finance:manage:payouts",
                ],
            ),
            PermissionGroup::new(
                "marketing",
                "Marketing",
                &[
                    "marketing:manage:campaigns",
                    "marketing:manage:banners",
                    "marketing:manage:referrals",
                    "marketing:view:analytics",
                ],
            ),
            PermissionGroup::new(
                "content",
                "Content",
                &[
                    "content:create",
                    "content:update",
                    "content:publish",
                    "content:delete",
                    "content:generate:ai",
                ],
            ),
            PermissionGroup::new(
                "support",
                "Support",
                &[
                    "support:view:tickets",
                    "support:respond:tickets",
                    "support:escalate:tickets",
                ],
            ),
            PermissionGroup::new(
                "tradcoin",
                "TradCoin",
                &[
                    "tradcoin:view:balances",
                    "tradcoin:manage:airdrops",
                    "tradcoin:approve:claims",
                ],
            ),
            PermissionGroup::new(
                "direct",
                "Tradinta Direct",
                &[
                    "direct:view:inventory",
                    "direct:manage:listings",
                    "direct:manage:fulfilment",
                ],
            ),
            PermissionGroup::new(
                "analytics",
                "Analytics",
                &["analytics:view:dashboard", "analytics:export"],
            ),
            PermissionGroup::new(
                "system",
                "System",
                &[
                    "system:view:logs",
                    "system:manage:settings",
                    "system:toggle:maintenance_mode",
                ],
            ),
        ])
    }

    /// Groups in presentation order.
    pub fn groups(&self) -> &[PermissionGroup] {
        &self.groups
    }

    /// Look up the group for a resource.
    pub fn group(&self, resource: &str) -> Option<&PermissionGroup> {
        self.groups.iter().find(|g| g.resource == resource)
    }

    /// Check if a permission string is catalogued.
    pub fn contains(&self, permission: &str) -> bool {
        self.index.contains(permission)
    }

    /// Every catalogued permission.
    pub fn all(&self) -> &BTreeSet<String> {
        &self.index
    }

    /// Iterate permissions in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.permissions.iter().map(String::as_str))
    }

    /// Number of distinct permissions.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Check the catalogue's own invariants.
    ///
    /// Every entry must parse, appear exactly once, and belong to the group
    /// named after its resource segment.
    pub fn validate(&self) -> RbacResult<()> {
        let mut seen = BTreeSet::new();
        for group in &self.groups {
            for entry in &group.permissions {
                let perm = Permission::parse(entry)?;
                if perm.resource != group.resource {
                    return Err(RbacError::Config(format!(
                        "permission '{}' is listed under resource group '{}'",
                        entry, group.resource
                    )));
                }
                if !seen.insert(entry.as_str()) {
                    return Err(RbacError::Config(format!(
                        "permission '{}' is catalogued more than once",
                        entry
                    )));
                }
            }
        }
        Ok(())
    }
}
