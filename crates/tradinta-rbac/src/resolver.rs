//! # Permission Resolution
//!
//! Answers "does role R grant permission P" and "which permissions does
//! role R grant" over an injected catalogue and registry.
//!
//! ## Traversal
//!
//! Both questions walk the inheritance graph depth-first from the requested
//! role, visiting `inherits` in declaration order. Each walk keeps its own
//! visited set and never enters a role twice, so it visits at most
//! `registry.len()` roles and terminates on any graph, cyclic or not.
//!
//! Resolution fails closed: an unknown role, an unknown permission or a
//! dangling `inherits` entry all simply contribute no grant.

use std::collections::{BTreeSet, HashSet};
use std::ops::ControlFlow;

use tracing::{debug, trace};

use crate::catalog::PermissionCatalog;
use crate::permissions::PermissionGrant;
use crate::restrictions::UserRestrictions;
use crate::roles::{Role, RoleRegistry};

/// Resolves permissions for role keys.
///
/// Holds only shared references; create one wherever a decision is needed.
///
/// # Example
///
/// ```
/// use tradinta_rbac::{PermissionCatalog, PermissionResolver, RoleRegistry};
///
/// let catalog = PermissionCatalog::tradinta();
/// let registry = RoleRegistry::tradinta();
/// let resolver = PermissionResolver::new(&catalog, &registry);
///
/// assert!(resolver.has_permission("user-management", "users:list"));
/// assert!(!resolver.has_permission("support", "users:update:role"));
/// assert!(resolver.has_permission("super-admin", "system:toggle:maintenance_mode"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PermissionResolver<'a> {
    catalog: &'a PermissionCatalog,
    registry: &'a RoleRegistry,
}

/// What a wildcard grant covers during a single check.
#[derive(Debug, Clone, Copy)]
enum Wildcard {
    /// Any string at all.
    Unconditional,
    /// Only strings in the catalogue, matching expansion.
    Catalogued,
}

impl<'a> PermissionResolver<'a> {
    /// Create a resolver over a catalogue and registry.
    pub fn new(catalog: &'a PermissionCatalog, registry: &'a RoleRegistry) -> Self {
        Self { catalog, registry }
    }

    /// The catalogue wildcard grants expand to.
    pub fn catalog(&self) -> &'a PermissionCatalog {
        self.catalog
    }

    /// The registry roles are looked up in.
    pub fn registry(&self) -> &'a RoleRegistry {
        self.registry
    }

    /// Check whether `role_key` grants `permission`, directly or through
    /// inheritance.
    ///
    /// Returns as soon as any visited role holds the wildcard grant or lists
    /// the exact permission string.
    pub fn has_permission(&self, role_key: &str, permission: &str) -> bool {
        if !self.registry.contains(role_key) {
            debug!(role = role_key, permission, "permission check for unknown role");
            return false;
        }

        let granted = self.grants(role_key, permission, Wildcard::Unconditional);
        if !granted {
            debug!(role = role_key, permission, "permission not granted");
        }
        granted
    }

    /// Check whether `role_key` grants at least one of `permissions`.
    pub fn has_any(&self, role_key: &str, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(role_key, p))
    }

    /// Check whether `role_key` grants every one of `permissions`.
    pub fn has_all(&self, role_key: &str, permissions: &[&str]) -> bool {
        permissions.iter().all(|p| self.has_permission(role_key, p))
    }

    /// Every permission `role_key` grants, with inheritance applied.
    ///
    /// A wildcard anywhere in the inheritance chain expands to the whole
    /// catalogue, so the result always holds concrete permission strings
    /// that restrictions can be subtracted from. Unknown roles expand to the
    /// empty set.
    pub fn expand_role_permissions(&self, role_key: &str) -> BTreeSet<String> {
        let mut expanded = BTreeSet::new();

        let _ = self.walk(role_key, |_, role| {
            match &role.permissions {
                PermissionGrant::All => expanded.extend(self.catalog.all().iter().cloned()),
                PermissionGrant::Explicit(set) => expanded.extend(set.iter().cloned()),
            }
            ControlFlow::<()>::Continue(())
        });

        expanded
    }

    /// The role's expanded permissions minus the user's restrictions.
    pub fn effective_permissions(
        &self,
        role_key: &str,
        restrictions: &UserRestrictions,
    ) -> BTreeSet<String> {
        restrictions.apply(self.expand_role_permissions(role_key))
    }

    /// Check a single permission against the role and the user's restrictions.
    ///
    /// Agrees with membership in [`effective_permissions`](Self::effective_permissions):
    /// a wildcard only covers catalogued permissions here.
    pub fn has_effective_permission(
        &self,
        role_key: &str,
        restrictions: &UserRestrictions,
        permission: &str,
    ) -> bool {
        if restrictions.contains(permission) {
            debug!(role = role_key, permission, "permission restricted for user");
            return false;
        }

        let granted = self.grants(role_key, permission, Wildcard::Catalogued);
        if !granted {
            debug!(role = role_key, permission, "effective permission not granted");
        }
        granted
    }

    /// Role keys reachable from `role_key`, in visit order, starting with it.
    ///
    /// Dangling references are omitted. Unknown roles yield an empty list.
    pub fn reachable_roles(&self, role_key: &str) -> Vec<String> {
        let mut reached = Vec::new();
        let _ = self.walk(role_key, |key, _| {
            reached.push(key.to_string());
            ControlFlow::<()>::Continue(())
        });
        reached
    }

    /// Role keys that grant `permission`, in key order.
    pub fn roles_granting(&self, permission: &str) -> Vec<String> {
        self.registry
            .keys()
            .filter(|key| self.grants(key, permission, Wildcard::Unconditional))
            .map(str::to_string)
            .collect()
    }

    fn grants(&self, role_key: &str, permission: &str, wildcard: Wildcard) -> bool {
        self.walk(role_key, |_, role| {
            let hit = match &role.permissions {
                PermissionGrant::All => match wildcard {
                    Wildcard::Unconditional => true,
                    Wildcard::Catalogued => self.catalog.contains(permission),
                },
                PermissionGrant::Explicit(set) => set.contains(permission),
            };
            if hit {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .is_break()
    }

    fn walk<F>(&self, role_key: &str, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(&str, &Role) -> ControlFlow<()>,
    {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut pending: Vec<&str> = vec![role_key];

        while let Some(key) = pending.pop() {
            if !visited.insert(key) {
                trace!(role = key, "role already visited, skipping");
                continue;
            }
            let Some(role) = self.registry.get(key) else {
                trace!(role = key, "inherited role is not registered");
                continue;
            };

            visit(key, role)?;

            // Reversed so the first declared parent is popped first.
            pending.extend(role.inherits.iter().rev().map(String::as_str));
        }

        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::span;
    use tracing::{Event, Level, Metadata, Subscriber};

    /// Counts `DEBUG` events emitted while it is the default subscriber.
    struct DebugEventCounter(Arc<AtomicUsize>);

    impl Subscriber for DebugEventCounter {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _: &span::Attributes<'_>) -> span::Id {
            span::Id::from_u64(1)
        }

        fn record(&self, _: &span::Id, _: &span::Record<'_>) {}

        fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}

        fn event(&self, event: &Event<'_>) {
            if *event.metadata().level() == Level::DEBUG {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn enter(&self, _: &span::Id) {}

        fn exit(&self, _: &span::Id) {}
    }

    fn debug_events<T>(f: impl FnOnce() -> T) -> (T, usize) {
        let count = Arc::new(AtomicUsize::new(0));
        let out = tracing::subscriber::with_default(DebugEventCounter(Arc::clone(&count)), f);
        (out, count.load(Ordering::SeqCst))
    }

    fn cyclic_registry() -> RoleRegistry {
        RoleRegistry::builder()
            .role(
                "admin",
                Role::new("Admin", "")
                    .with_permissions(&["users:delete"])
                    .inheriting(&["ops"]),
            )
            .role(
                "ops",
                Role::new("Ops", "")
                    .with_permissions(&["orders:update:status"])
                    .inheriting(&["admin"]),
            )
            .build()
    }

    #[test]
    fn test_direct_grant() {
        let catalog = PermissionCatalog::tradinta();
        let registry = RoleRegistry::tradinta();
        let resolver = PermissionResolver::new(&catalog, &registry);

        assert!(resolver.has_permission("support", "users:list"));
        assert!(resolver.has_permission("user-management", "users:update:role"));
        assert!(!resolver.has_permission("support", "users:update:role"));
    }

    #[test]
    fn test_inherited_grant() {
        let catalog = PermissionCatalog::tradinta();
        let registry = RoleRegistry::tradinta();
        let resolver = PermissionResolver::new(&catalog, &registry);

        assert!(resolver.has_permission("user-management", "users:list"));
        assert!(resolver.has_permission("admin", "finance:manage:escrow"));
        assert!(resolver.has_permission("admin", "support:view:tickets"));
        assert!(!resolver.has_permission("admin", "system:toggle:maintenance_mode"));
    }

    #[test]
    fn test_wildcard_grant() {
        let catalog = PermissionCatalog::tradinta();
        let registry = RoleRegistry::tradinta();
        let resolver = PermissionResolver::new(&catalog, &registry);

        assert!(resolver.has_permission("super-admin", "system:toggle:maintenance_mode"));
        assert!(resolver.has_permission("super-admin", "not:in:catalog"));
        assert_eq!(&resolver.expand_role_permissions("super-admin"), catalog.all());
    }

    #[test]
    fn test_wildcard_through_inheritance() {
        let catalog = PermissionCatalog::tradinta();
        let registry = RoleRegistry::builder()
            .role("root", Role::new("Root", "").with_all_permissions())
            .role("deputy", Role::new("Deputy", "").inheriting(&["root"]))
            .build();
        let resolver = PermissionResolver::new(&catalog, &registry);

        assert!(resolver.has_permission("deputy", "finance:manage:payouts"));
        assert_eq!(&resolver.expand_role_permissions("deputy"), catalog.all());
    }

    #[test]
    fn test_unknown_role() {
        let catalog = PermissionCatalog::tradinta();
        let registry = RoleRegistry::tradinta();
        let resolver = PermissionResolver::new(&catalog, &registry);

        assert!(!resolver.has_permission("nobody", "users:list"));
        assert!(resolver.expand_role_permissions("nobody").is_empty());
        assert!(resolver.reachable_roles("nobody").is_empty());
    }

    #[test]
    fn test_unknown_permission() {
        let catalog = PermissionCatalog::tradinta();
        let registry = RoleRegistry::tradinta();
        let resolver = PermissionResolver::new(&catalog, &registry);

        assert!(!resolver.has_permission("admin", "users:teleport"));
        assert!(!resolver.has_permission("admin", ""));
        assert!(!resolver.has_permission("admin", "*"));
    }

    #[test]
    fn test_cycle_terminates() {
        let catalog = PermissionCatalog::tradinta();
        let registry = cyclic_registry();
        let resolver = PermissionResolver::new(&catalog, &registry);

        assert!(resolver.has_permission("admin", "orders:update:status"));
        assert!(resolver.has_permission("ops", "users:delete"));
        assert!(!resolver.has_permission("admin", "finance:manage:escrow"));
        assert!(!resolver.has_permission("ops", "finance:manage:escrow"));

        let expanded = resolver.expand_role_permissions("ops");
        assert_eq!(
            expanded.into_iter().collect::<Vec<_>>(),
            vec!["orders:update:status", "users:delete"]
        );
        assert_eq!(resolver.reachable_roles("admin"), vec!["admin", "ops"]);
    }

    #[test]
    fn test_self_inheritance_terminates() {
        let catalog = PermissionCatalog::tradinta();
        let registry = RoleRegistry::builder()
            .role("loop", Role::new("Loop", "").inheriting(&["loop"]))
            .build();
        let resolver = PermissionResolver::new(&catalog, &registry);

        assert!(!resolver.has_permission("loop", "users:list"));
        assert!(resolver.expand_role_permissions("loop").is_empty());
    }

    #[test]
    fn test_dangling_inheritance_contributes_nothing() {
        let catalog = PermissionCatalog::tradinta();
        let registry = RoleRegistry::builder()
            .role(
                "orphan",
                Role::new("Orphan", "")
                    .with_permissions(&["users:list"])
                    .inheriting(&["missing", "also-missing"]),
            )
            .build();
        let resolver = PermissionResolver::new(&catalog, &registry);

        assert!(resolver.has_permission("orphan", "users:list"));
        assert!(!resolver.has_permission("orphan", "users:view"));
        assert_eq!(resolver.expand_role_permissions("orphan").len(), 1);
    }

    #[test]
    fn test_declaration_order_is_followed() {
        let catalog = PermissionCatalog::tradinta();
        let registry = RoleRegistry::tradinta();
        let resolver = PermissionResolver::new(&catalog, &registry);

        assert_eq!(
            resolver.reachable_roles("admin"),
            vec![
                "admin",
                "operations-manager",
                "user-management",
                "support",
                "content-manager",
                "marketing-manager",
                "tradpay-admin",
                "finance",
                "tradcoin-airdrop",
                "tradinta-direct-admin",
            ]
        );
    }

    #[test]
    fn test_has_any_has_all() {
        let catalog = PermissionCatalog::tradinta();
        let registry = RoleRegistry::tradinta();
        let resolver = PermissionResolver::new(&catalog, &registry);

        assert!(resolver.has_any("support", &["users:delete", "users:list"]));
        assert!(!resolver.has_any("support", &["users:delete", "finance:manage:escrow"]));
        assert!(resolver.has_all("tradpay-admin", &["orders:refund", "finance:manage:escrow"]));
        assert!(!resolver.has_all("tradpay-admin", &["orders:refund", "users:delete"]));
        assert!(!resolver.has_any("support", &[]));
        assert!(resolver.has_all("support", &[]));
    }

    #[test]
    fn test_effective_permissions() {
        let catalog = PermissionCatalog::tradinta();
        let registry = RoleRegistry::tradinta();
        let resolver = PermissionResolver::new(&catalog, &registry);
        let restrictions = UserRestrictions::from_iter(["users:list", "finance:manage:escrow"]);

        let effective = resolver.effective_permissions("user-management", &restrictions);
        assert!(!effective.contains("users:list"));
        assert!(effective.contains("users:view"));
        assert!(effective.contains("users:update:role"));

        assert!(!resolver.has_effective_permission("user-management", &restrictions, "users:list"));
        assert!(resolver.has_effective_permission("user-management", &restrictions, "users:view"));
        assert!(!resolver.has_effective_permission(
            "super-admin",
            &restrictions,
            "finance:manage:escrow"
        ));
    }

    #[test]
    fn test_roles_granting() {
        let catalog = PermissionCatalog::tradinta();
        let registry = RoleRegistry::tradinta();
        let resolver = PermissionResolver::new(&catalog, &registry);

        assert_eq!(
            resolver.roles_granting("finance:manage:escrow"),
            vec!["admin", "finance", "super-admin", "tradpay-admin"]
        );
        assert_eq!(
            resolver.roles_granting("system:toggle:maintenance_mode"),
            vec!["super-admin"]
        );
    }

    #[test]
    fn test_roles_granting_does_not_log_denials() {
        let catalog = PermissionCatalog::tradinta();
        let registry = RoleRegistry::tradinta();
        let resolver = PermissionResolver::new(&catalog, &registry);

        let (roles, events) =
            debug_events(|| resolver.roles_granting("system:toggle:maintenance_mode"));
        assert_eq!(roles, vec!["super-admin"]);
        assert_eq!(events, 0);

        let (granted, events) = debug_events(|| {
            resolver.has_permission("support", "system:toggle:maintenance_mode")
        });
        assert!(!granted);
        assert_eq!(events, 1);
    }

    #[test]
    fn test_effective_check_matches_effective_set() {
        let catalog = PermissionCatalog::tradinta();
        let registry = RoleRegistry::tradinta();
        let resolver = PermissionResolver::new(&catalog, &registry);
        let restrictions = UserRestrictions::from_iter(["users:list"]);

        assert!(resolver.has_permission("super-admin", "reports:export:legacy"));
        assert!(!resolver.has_effective_permission(
            "super-admin",
            &restrictions,
            "reports:export:legacy"
        ));

        for role in registry.keys() {
            let effective = resolver.effective_permissions(role, &restrictions);
            for permission in catalog.iter() {
                assert_eq!(
                    resolver.has_effective_permission(role, &restrictions, permission),
                    effective.contains(permission),
                    "{role} / {permission}"
                );
            }
        }
    }
}
