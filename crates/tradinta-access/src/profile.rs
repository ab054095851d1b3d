//! User access profiles
//!
//! The slice of a user's profile that authorization needs: their role key and
//! their restriction list. Profiles are owned by the user-management store;
//! this crate only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tradinta_rbac::UserRestrictions;

/// A user's role and restrictions.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tradinta_access::UserAccessProfile;
///
/// let profile = UserAccessProfile::new(Uuid::now_v7(), "support")
///     .with_restrictions(["orders:view"]);
/// assert_eq!(profile.role, "support");
/// assert!(profile.restrictions.contains("orders:view"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccessProfile {
    /// User ID
    pub user_id: Uuid,

    /// Role key in the registry
    pub role: String,

    /// Permissions revoked for this user regardless of role
    #[serde(default)]
    pub restrictions: UserRestrictions,

    /// When the role or restrictions last changed
    pub updated_at: DateTime<Utc>,
}

impl UserAccessProfile {
    /// Creates a profile with no restrictions.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user ID
    /// * `role` - The user's role key
    pub fn new(user_id: Uuid, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
            restrictions: UserRestrictions::new(),
            updated_at: Utc::now(),
        }
    }

    /// Replace the restriction list.
    pub fn with_restrictions<I, S>(mut self, restrictions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.restrictions = restrictions.into_iter().collect();
        self
    }

    /// Change the user's role.
    pub fn assign_role(&mut self, role: impl Into<String>) {
        self.role = role.into();
        self.touch();
    }

    /// Revoke a permission for this user.
    pub fn restrict(&mut self, permission: impl Into<String>) {
        if self.restrictions.restrict(permission) {
            self.touch();
        }
    }

    /// Lift a revocation for this user.
    pub fn lift(&mut self, permission: &str) {
        if self.restrictions.lift(permission) {
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
