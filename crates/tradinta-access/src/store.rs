//! Profile store seam
//!
//! The gate fetches a user's role and restrictions through [`ProfileStore`]
//! before every check. Production backends live with the user-management
//! service; [`InMemoryProfileStore`] serves tests and local tooling.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use tradinta_rbac::UserRestrictions;

use crate::error::{AccessError, AccessResult};
use crate::profile::UserAccessProfile;

/// Source of user access profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a user's profile. `Ok(None)` means the user is unknown.
    async fn fetch(&self, user_id: Uuid) -> AccessResult<Option<UserAccessProfile>>;
}

#[async_trait]
impl<S: ProfileStore + ?Sized> ProfileStore for Arc<S> {
    async fn fetch(&self, user_id: Uuid) -> AccessResult<Option<UserAccessProfile>> {
        (**self).fetch(user_id).await
    }
}

/// Profile store backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<Uuid, UserAccessProfile>>,
}

impl InMemoryProfileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile.
    pub async fn upsert(&self, profile: UserAccessProfile) {
        self.profiles.write().await.insert(profile.user_id, profile);
    }

    /// Replace a user's restriction list.
    pub async fn set_restrictions(
        &self,
        user_id: Uuid,
        restrictions: UserRestrictions,
    ) -> AccessResult<()> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(&user_id)
            .ok_or_else(|| AccessError::Store(format!("no profile for user {}", user_id)))?;
        profile.restrictions = restrictions;
        profile.updated_at = chrono::Utc::now();
        Ok(())
    }

    /// Remove a profile, returning it if present.
    pub async fn remove(&self, user_id: Uuid) -> Option<UserAccessProfile> {
        self.profiles.write().await.remove(&user_id)
    }

    /// Number of stored profiles.
    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    /// Check if empty.
    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn fetch(&self, user_id: Uuid) -> AccessResult<Option<UserAccessProfile>> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }
}
