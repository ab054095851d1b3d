//! # Tradinta Access Gates
//!
//! This crate connects the pure resolver in `tradinta-rbac` to the users it
//! authorizes. It fetches a user's role and restriction list from a
//! [`ProfileStore`] and turns them into a binary decision for a guarded
//! page, route or UI region.
//!
//! ## Architecture
//!
//! ```text
//! request (user_id) ─→ AccessGate ─→ ProfileStore::fetch ─→ UserAccessProfile
//!                          │                                   (role, restrictions)
//!                          └─→ AccessPolicy (Arc, immutable)
//!                                 ├─ has_permission(role, p)
//!                                 └─ expand(role) − restrictions
//!                          ─→ AccessDecision::{Granted, Denied}
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tradinta_access::{AccessGate, InMemoryProfileStore, Requirement, UserAccessProfile};
//! use tradinta_rbac::RbacConfig;
//! use uuid::Uuid;
//!
//! # async fn run() -> Result<(), tradinta_access::AccessError> {
//! let policy = Arc::new(RbacConfig::from_env()?.into_policy()?);
//! let gate = AccessGate::new(policy, InMemoryProfileStore::new());
//!
//! let user_id = Uuid::now_v7();
//! gate.store().upsert(UserAccessProfile::new(user_id, "tradpay-admin")).await;
//!
//! gate.require(user_id, &Requirement::effective("finance:manage:escrow")).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod gate;
pub mod profile;
pub mod store;

// Re-export main types for convenience
pub use error::{AccessError, AccessResult};
pub use gate::{AccessDecision, AccessGate, Requirement};
pub use profile::UserAccessProfile;
pub use store::{InMemoryProfileStore, ProfileStore};
