//! # Tradinta RBAC (Role-Based Access Control)
//!
//! This crate provides the authorization core of the Tradinta marketplace,
//! shared by the admin dashboards, TradPay, TradCoin and Tradinta Direct.
//!
//! ## Overview
//!
//! The tradinta-rbac crate handles:
//! - **Catalogue**: every recognised permission, grouped by resource
//! - **Roles**: named permission bundles that inherit other roles
//! - **Resolution**: does a role grant a permission, and which ones
//! - **Restrictions**: per-user revocations subtracted from role grants
//!
//! ## Architecture
//!
//! ```text
//! Permission = resource:action[:scope]
//!
//! Examples:
//!   "users:list"                     - List user accounts
//!   "orders:update:status"           - Change an order's status
//!   "system:toggle:maintenance_mode" - Switch maintenance mode
//!
//! AccessPolicy
//!   ├─ PermissionCatalog (groups → permissions)
//!   └─ RoleRegistry (key → Role { permissions: All | Explicit, inherits })
//!
//! effective(user) = expand(role) − restrictions(user)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use tradinta_rbac::{AccessPolicy, UserRestrictions};
//!
//! let policy = AccessPolicy::tradinta();
//!
//! // Inherited: user-management inherits support
//! assert!(policy.has_permission("user-management", "users:list"));
//! // Not inherited upwards
//! assert!(!policy.has_permission("support", "users:update:role"));
//! // Wildcard
//! assert!(policy.has_permission("super-admin", "system:toggle:maintenance_mode"));
//!
//! // Per-user restrictions
//! let restrictions = UserRestrictions::from_iter(["users:list"]);
//! let effective = policy.effective_permissions("user-management", &restrictions);
//! assert!(!effective.contains("users:list"));
//! ```
//!
//! ## Failure Semantics
//!
//! Resolution never errors. Unknown roles, unknown permissions, dangling
//! inheritance and inheritance cycles all deny. Configuration problems are
//! reported by [`AccessPolicy::validate`] and [`RbacConfig::into_policy`].

pub mod catalog;
pub mod config;
pub mod error;
pub mod permissions;
pub mod policy;
pub mod resolver;
pub mod restrictions;
pub mod roles;

// Re-export main types for convenience
pub use catalog::{PermissionCatalog, PermissionGroup};
pub use config::RbacConfig;
pub use error::{RbacError, RbacResult, RegistryIssue};
pub use permissions::{Permission, PermissionGrant};
pub use policy::AccessPolicy;
pub use resolver::PermissionResolver;
pub use restrictions::{PermissionToggle, ToggleGroup, UserRestrictions};
pub use roles::{Role, RoleRegistry, RoleRegistryBuilder};
