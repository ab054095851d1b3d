//! # Permissions
//!
//! Permission identifiers and the permission grants attached to roles.
//!
//! A permission is an opaque string of the form `resource:action` or
//! `resource:action:scope`. Authorization always compares whole strings;
//! [`Permission`] is a parsed view used to validate the catalogue and group
//! entries by resource.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{RbacError, RbacResult};

/// Configuration literal that grants every permission.
pub const WILDCARD: &str = "*";

/// Parsed view of a permission string.
///
/// # Example
///
/// ```
/// use tradinta_rbac::permissions::Permission;
///
/// let perm = Permission::parse("orders:update:status").unwrap();
/// assert_eq!(perm.resource, "orders");
/// assert_eq!(perm.action, "update");
/// assert_eq!(perm.scope.as_deref(), Some("status"));
/// assert_eq!(perm.to_string(), "orders:update:status");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Permission {
    /// The resource segment (e.g. `orders`).
    pub resource: String,
    /// The action segment (e.g. `update`).
    pub action: String,
    /// Optional narrowing of the action (e.g. `status`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Permission {
    /// Create a `resource:action` permission.
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            scope: None,
        }
    }

    /// Create a `resource:action:scope` permission.
    pub fn scoped(
        resource: impl Into<String>,
        action: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            scope: Some(scope.into()),
        }
    }

    /// Parse from string (e.g. `users:list` or `users:update:role`).
    ///
    /// Segments must be non-empty and made of lowercase ASCII letters,
    /// digits, `_` or `-`. The wildcard `*` is not a permission.
    ///
    /// ```
    /// use tradinta_rbac::permissions::Permission;
    ///
    /// assert!(Permission::parse("users:list").is_ok());
    /// assert!(Permission::parse("*").is_err());
    /// assert!(Permission::parse("users").is_err());
    /// assert!(Permission::parse("a:b:c:d").is_err());
    /// ```
    pub fn parse(s: &str) -> RbacResult<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if !(2..=3).contains(&parts.len()) || !parts.iter().all(|p| is_valid_segment(p)) {
            return Err(RbacError::InvalidPermission(s.to_string()));
        }

        Ok(Self {
            resource: parts[0].to_string(),
            action: parts[1].to_string(),
            scope: parts.get(2).map(|p| p.to_string()),
        })
    }

    /// Check if this permission narrows its action with a scope.
    pub fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}:{}:{}", self.resource, self.action, scope),
            None => write!(f, "{}:{}", self.resource, self.action),
        }
    }
}

impl FromStr for Permission {
    type Err = RbacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The permissions a role grants on its own, before inheritance.
///
/// `All` is the unconditional grant written as `"*"` in configuration. It is
/// a distinct variant so that no catalogued permission string can ever be
/// mistaken for it.
///
/// # Example
///
/// ```
/// use tradinta_rbac::permissions::PermissionGrant;
///
/// let grant: PermissionGrant = serde_json::from_str(r#"["*"]"#).unwrap();
/// assert!(grant.is_all());
///
/// let grant = PermissionGrant::explicit(["users:list", "orders:list"]);
/// assert!(grant.grants("users:list"));
/// assert!(!grant.grants("users:delete"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum PermissionGrant {
    /// Every permission, unconditionally.
    All,
    /// Exactly these permission strings.
    Explicit(BTreeSet<String>),
}

impl PermissionGrant {
    /// Grant a fixed list of permission strings.
    ///
    /// A `"*"` entry anywhere in the list yields [`PermissionGrant::All`],
    /// the same as loading that list from configuration.
    pub fn explicit<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        permissions
            .into_iter()
            .map(Into::into)
            .collect::<Vec<String>>()
            .into()
    }

    /// Grant nothing directly.
    pub fn none() -> Self {
        Self::Explicit(BTreeSet::new())
    }

    /// Check if this is the unconditional grant.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Check whether this grant, on its own, covers `permission`.
    pub fn grants(&self, permission: &str) -> bool {
        match self {
            Self::All => true,
            Self::Explicit(set) => set.contains(permission),
        }
    }

    /// Iterate the explicitly listed permissions (empty for `All`).
    pub fn listed(&self) -> impl Iterator<Item = &str> {
        let set = match self {
            Self::All => None,
            Self::Explicit(set) => Some(set),
        };
        set.into_iter().flatten().map(String::as_str)
    }
}

impl Default for PermissionGrant {
    fn default() -> Self {
        Self::none()
    }
}

impl From<Vec<String>> for PermissionGrant {
    fn from(permissions: Vec<String>) -> Self {
        if permissions.iter().any(|p| p == WILDCARD) {
            Self::All
        } else {
            Self::Explicit(permissions.into_iter().collect())
        }
    }
}

impl From<PermissionGrant> for Vec<String> {
    fn from(grant: PermissionGrant) -> Self {
        match grant {
            PermissionGrant::All => vec![WILDCARD.to_string()],
            PermissionGrant::Explicit(set) => set.into_iter().collect(),
        }
    }
}
