//! Access gates
//!
//! A gate guards one page, route or UI region. It admits or denies as a
//! whole; nothing is partially rendered. Two kinds of requirement exist:
//!
//! - [`Requirement::Role`]: the user's role must grant the permission.
//! - [`Requirement::Effective`]: the role must grant it and the user must not
//!   have it restricted.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use tradinta_rbac::AccessPolicy;

use crate::error::{AccessError, AccessResult};
use crate::profile::UserAccessProfile;
use crate::store::ProfileStore;

/// What a guarded region requires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "permission", rename_all = "snake_case")]
pub enum Requirement {
    /// Granted by the role, restrictions ignored.
    Role(String),
    /// Granted by the role and not restricted for the user.
    Effective(String),
}

impl Requirement {
    /// Require a role grant.
    pub fn role(permission: impl Into<String>) -> Self {
        Self::Role(permission.into())
    }

    /// Require an effective (restriction-aware) grant.
    pub fn effective(permission: impl Into<String>) -> Self {
        Self::Effective(permission.into())
    }

    /// The permission string being required.
    pub fn permission(&self) -> &str {
        match self {
            Self::Role(p) | Self::Effective(p) => p,
        }
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// Render the protected content.
    Granted,
    /// Render the uniform access-denied result.
    Denied,
}

impl AccessDecision {
    /// Check if access was granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl From<bool> for AccessDecision {
    fn from(granted: bool) -> Self {
        if granted {
            Self::Granted
        } else {
            Self::Denied
        }
    }
}

/// Admits or denies users against an [`AccessPolicy`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use uuid::Uuid;
/// use tradinta_access::{AccessDecision, AccessGate, InMemoryProfileStore, Requirement, UserAccessProfile};
/// use tradinta_rbac::AccessPolicy;
///
/// let gate = AccessGate::new(Arc::new(AccessPolicy::tradinta()), InMemoryProfileStore::new());
/// let profile = UserAccessProfile::new(Uuid::now_v7(), "support");
///
/// assert_eq!(gate.evaluate(&profile, &Requirement::role("users:list")), AccessDecision::Granted);
/// assert_eq!(gate.evaluate(&profile, &Requirement::role("users:delete")), AccessDecision::Denied);
/// ```
#[derive(Debug, Clone)]
pub struct AccessGate<S> {
    policy: Arc<AccessPolicy>,
    store: S,
}

impl<S: ProfileStore> AccessGate<S> {
    /// Create a gate over a shared policy and a profile store.
    pub fn new(policy: Arc<AccessPolicy>, store: S) -> Self {
        Self { policy, store }
    }

    /// The policy decisions are made against.
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// The profile store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Decide for an already-fetched profile.
    pub fn evaluate(&self, profile: &UserAccessProfile, requirement: &Requirement) -> AccessDecision {
        if !self.policy.registry().contains(&profile.role) {
            warn!(
                user_id = %profile.user_id,
                role = %profile.role,
                "user profile names a role that is not configured"
            );
            return AccessDecision::Denied;
        }

        let resolver = self.policy.resolver();
        let permission = requirement.permission();
        let granted = match requirement {
            Requirement::Role(_) => resolver.has_permission(&profile.role, permission),
            Requirement::Effective(_) => {
                resolver.has_effective_permission(&profile.role, &profile.restrictions, permission)
            }
        };

        if !granted {
            debug!(
                user_id = %profile.user_id,
                role = %profile.role,
                permission,
                restricted = profile.restrictions.contains(permission),
                "access denied"
            );
        }
        granted.into()
    }

    /// Fetch the user's profile and decide.
    ///
    /// Unknown users are denied. Store failures are returned as errors so
    /// callers can tell an outage from a denial.
    #[instrument(skip(self))]
    pub async fn check(&self, user_id: Uuid, requirement: &Requirement) -> AccessResult<AccessDecision> {
        match self.store.fetch(user_id).await? {
            Some(profile) => Ok(self.evaluate(&profile, requirement)),
            None => {
                warn!(%user_id, "access check for user without a profile");
                Ok(AccessDecision::Denied)
            }
        }
    }

    /// Like [`check`](Self::check), but a denial becomes
    /// [`AccessError::Denied`].
    pub async fn require(&self, user_id: Uuid, requirement: &Requirement) -> AccessResult<()> {
        match self.check(user_id, requirement).await? {
            AccessDecision::Granted => Ok(()),
            AccessDecision::Denied => Err(AccessError::Denied {
                permission: requirement.permission().to_string(),
            }),
        }
    }

    /// The user's effective permissions. Unknown users have none.
    #[instrument(skip(self))]
    pub async fn effective_permissions(&self, user_id: Uuid) -> AccessResult<BTreeSet<String>> {
        Ok(self
            .store
            .fetch(user_id)
            .await?
            .map(|profile| {
                self.policy
                    .effective_permissions(&profile.role, &profile.restrictions)
            })
            .unwrap_or_default())
    }
}
