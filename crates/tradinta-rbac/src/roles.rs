//! # Roles
//!
//! Role definitions and the registry that maps role keys to them.
//!
//! Roles are addressed by a short machine key (`user-management`), distinct
//! from their display name. A role may inherit other roles by key, so the
//! registry forms a directed graph. Nothing guarantees that graph is acyclic;
//! [`RoleRegistry::find_cycles`] reports loops and the resolver tolerates them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::catalog::PermissionCatalog;
use crate::error::{RbacError, RbacResult, RegistryIssue};
use crate::permissions::PermissionGrant;

/// A named bundle of permissions.
///
/// # Examples
///
/// ```
/// use tradinta_rbac::Role;
///
/// let role = Role::new("User Management", "Manages user accounts")
///     .with_permissions(&["users:update:role"])
///     .inheriting(&["support"]);
/// assert!(role.permissions.grants("users:update:role"));
/// assert_eq!(role.inherits, vec!["support".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Display name
    pub name: String,

    /// What the role is for
    #[serde(default)]
    pub description: String,

    /// Permissions granted directly by this role
    #[serde(default)]
    pub permissions: PermissionGrant,

    /// Keys of roles whose permissions this role also grants, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inherits: Vec<String>,
}

impl Role {
    /// Create a role that grants nothing yet.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            permissions: PermissionGrant::none(),
            inherits: Vec::new(),
        }
    }

    /// Grant the listed permissions directly.
    pub fn with_permissions(mut self, permissions: &[&str]) -> Self {
        self.permissions = PermissionGrant::explicit(permissions.iter().copied());
        self
    }

    /// Grant every permission unconditionally.
    pub fn with_all_permissions(mut self) -> Self {
        self.permissions = PermissionGrant::All;
        self
    }

    /// Inherit the listed roles, checked in the given order.
    pub fn inheriting(mut self, roles: &[&str]) -> Self {
        self.inherits = roles.iter().map(|r| r.to_string()).collect();
        self
    }
}

/// Immutable mapping from role key to [`Role`].
///
/// # Examples
///
/// ```
/// use tradinta_rbac::{Role, RoleRegistry};
///
/// let registry = RoleRegistry::builder()
///     .role("support", Role::new("Support", "").with_permissions(&["users:list"]))
///     .build();
/// assert!(registry.get("support").is_some());
/// assert!(registry.get("nobody").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleRegistry {
    roles: BTreeMap<String, Role>,
}

/// Builder for [`RoleRegistry`].
#[derive(Debug, Default)]
pub struct RoleRegistryBuilder {
    roles: BTreeMap<String, Role>,
}

impl RoleRegistryBuilder {
    /// Add a role under `key`, replacing any earlier role with that key.
    pub fn role(mut self, key: impl Into<String>, role: Role) -> Self {
        self.roles.insert(key.into(), role);
        self
    }

    /// Finish the registry.
    pub fn build(self) -> RoleRegistry {
        RoleRegistry { roles: self.roles }
    }
}

impl RoleRegistry {
    /// Start building a registry.
    pub fn builder() -> RoleRegistryBuilder {
        RoleRegistryBuilder::default()
    }

    /// Build a registry from an existing map.
    pub fn from_roles(roles: BTreeMap<String, Role>) -> Self {
        Self { roles }
    }

    /// The production Tradinta role registry.
    pub fn tradinta() -> Self {
        Self::builder()
            .role(
                "super-admin",
                Role::new("Super Admin", "Unrestricted access to every part of the platform")
                    .with_all_permissions(),
            )
            .role(
                "admin",
                Role::new("Admin", "Runs the marketplace day to day across all departments")
                    .inheriting(&[
                        "operations-manager",
                        "marketing-manager",
                        "tradpay-admin",
                        "tradcoin-airdrop",
                        "tradinta-direct-admin",
                    ]),
            )
            .role(
                "operations-manager",
                Role::new("Operations Manager", "Oversees sellers, listings and order flow")
                    .with_permissions(&[
                        "sellers:list",
                        "sellers:verify",
                        "sellers:suspend",
                        "products:list",
                        "products:update",
                        "products:delete",
                        "products:approve",
                        "orders:update:status",
                        "orders:cancel",
                        "analytics:view:dashboard",
                        "system:view:logs",
                    ])
                    .inheriting(&["user-management", "content-manager"]),
            )
            .role(
                "user-management",
                Role::new("User Management", "Creates accounts and assigns roles")
                    .with_permissions(&[
                        "users:create",
                        "users:update",
                        "users:update:role",
                        "users:update:restrictions",
                        "users:suspend",
                    ])
                    .inheriting(&["support"]),
            )
            .role(
                "support",
                Role::new("Support", "Handles customer tickets and order enquiries")
                    .with_permissions(&[
                        "users:list",
                        "users:view",
                        "orders:list",
                        "orders:view",
                        "support:view:tickets",
                        "support:respond:tickets",
                        "support:escalate:tickets",
                    ]),
            )
            .role(
                "marketing-manager",
                Role::new("Marketing Manager", "Runs campaigns, banners and referral programmes")
                    .with_permissions(&[
                        "marketing:manage:campaigns",
                        "marketing:manage:banners",
                        "marketing:manage:referrals",
                        "marketing:view:analytics",
                        "products:feature",
                        "analytics:view:dashboard",
                    ])
                    .inheriting(&["content-manager"]),
            )
            .role(
                "content-manager",
                Role::new("Content Manager", "Writes and publishes marketplace content")
                    .with_permissions(&[
                        "content:create",
                        "content:update",
                        "content:publish",
                        "content:delete",
                        "content:generate:ai",
                    ]),
            )
            .role(
                "tradpay-admin",
                Role::new("TradPay Admin", "Administers TradPay payments and refunds")
                    .with_permissions(&["orders:list", "orders:view", "orders:refund"])
                    .inheriting(&["finance"]),
            )
            .role(
                "finance",
                Role::new("Finance", "Manages escrow, payouts and financial reporting")
                    .with_permissions(&[
                        "finance:view:reports",
                        "finance:view:transactions",
                        "finance:manage:escrow",
                        "finance:manage:payouts",
                        "analytics:view:dashboard",
                        "analytics:export",
                    ]),
            )
            .role(
                "tradcoin-airdrop",
                Role::new("TradCoin Airdrop", "Runs TradCoin airdrops and reviews claims")
                    .with_permissions(&[
                        "tradcoin:view:balances",
                        "tradcoin:manage:airdrops",
                        "tradcoin:approve:claims",
                    ]),
            )
            .role(
                "tradinta-direct-admin",
                Role::new("Tradinta Direct Admin", "Manages first-party listings and fulfilment")
                    .with_permissions(&[
                        "direct:view:inventory",
                        "direct:manage:listings",
                        "direct:manage:fulfilment",
                        "products:create",
                        "products:update",
                        "orders:update:status",
                    ]),
            )
            .role(
                "seller",
                Role::new("Seller", "Lists products and fulfils their own orders")
                    .with_permissions(&[
                        "products:list",
                        "products:create",
                        "products:update",
                        "orders:list",
                        "orders:view",
                        "orders:update:status",
                        "direct:view:inventory",
                    ]),
            )
            .role(
                "buyer",
                Role::new("Buyer", "Browses the catalogue and places orders")
                    .with_permissions(&["products:list", "orders:create", "orders:view"]),
            )
            .build()
    }

    /// Look up a role by key. An unknown key is a normal outcome.
    pub fn get(&self, key: &str) -> Option<&Role> {
        self.roles.get(key)
    }

    /// Check if a role key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.roles.contains_key(key)
    }

    /// Role keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    /// Iterate `(key, role)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Role)> {
        self.roles.iter().map(|(k, r)| (k.as_str(), r))
    }

    /// Number of roles.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Collect every consistency problem against `catalog`.
    ///
    /// Reports dangling `inherits` entries, permissions missing from the
    /// catalogue and inheritance cycles. None of these break resolution;
    /// they indicate configuration drift.
    pub fn check(&self, catalog: &PermissionCatalog) -> Vec<RegistryIssue> {
        let mut issues = Vec::new();

        for (key, role) in &self.roles {
            for parent in &role.inherits {
                if !self.roles.contains_key(parent) {
                    issues.push(RegistryIssue::DanglingInheritance {
                        role: key.clone(),
                        inherits: parent.clone(),
                    });
                }
            }
            for permission in role.permissions.listed() {
                if !catalog.contains(permission) {
                    issues.push(RegistryIssue::UncataloguedPermission {
                        role: key.clone(),
                        permission: permission.to_string(),
                    });
                }
            }
        }

        issues.extend(
            self.find_cycles()
                .into_iter()
                .map(RegistryIssue::InheritanceCycle),
        );
        issues
    }

    /// Like [`check`](Self::check), but fail if anything was found.
    pub fn validate(&self, catalog: &PermissionCatalog) -> RbacResult<()> {
        let issues = self.check(catalog);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(RbacError::InvalidRegistry { issues })
        }
    }

    /// Find inheritance cycles.
    ///
    /// Every elementary cycle is returned exactly once as the chain of role
    /// keys, starting and ending on its smallest key (`["a", "b", "a"]`). A
    /// role inheriting itself is reported as `["a", "a"]`. Cycles come out
    /// ordered by start key, then by `inherits` declaration order.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();

        for start in self.roles.keys() {
            let mut path = vec![start.as_str()];
            self.collect_cycles(start, start, &mut path, &mut cycles);
        }
        cycles
    }

    // Only keys greater than `start` are entered, so each cycle is found
    // from its smallest key and nowhere else.
    fn collect_cycles<'a>(
        &'a self,
        start: &'a str,
        key: &'a str,
        path: &mut Vec<&'a str>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        let Some(role) = self.roles.get(key) else {
            return;
        };

        let mut followed = HashSet::new();
        for parent in &role.inherits {
            let parent = parent.as_str();
            if !followed.insert(parent) {
                continue;
            }

            if parent == start {
                let mut cycle: Vec<String> = path.iter().map(|k| k.to_string()).collect();
                cycle.push(start.to_string());
                cycles.push(cycle);
            } else if parent > start && self.roles.contains_key(parent) && !path.contains(&parent)
            {
                path.push(parent);
                self.collect_cycles(start, parent, path, cycles);
                path.pop();
            }
        }
    }
}
