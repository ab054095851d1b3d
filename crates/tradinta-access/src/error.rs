//! Error types for access checks
//!
//! A denied check is a normal outcome and is returned as
//! [`AccessDecision::Denied`](crate::gate::AccessDecision). These errors cover
//! callers that want denial as an error, and failures of the collaborators
//! the gate depends on.

use thiserror::Error;
use tradinta_rbac::RbacError;

/// Access check error types.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The user does not hold the required permission
    #[error("Access denied: missing permission '{permission}'")]
    Denied {
        /// The permission that was required.
        permission: String,
    },

    /// The profile store failed to answer
    #[error("Profile store error: {0}")]
    Store(String),

    /// Access configuration is invalid
    #[error(transparent)]
    Rbac(#[from] RbacError),
}

/// Result type for access checks.
pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    /// Check if this error should be logged at error level.
    ///
    /// Denials are expected and should not be logged as errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AccessError::Store(_) | AccessError::Rbac(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AccessError::Denied { .. } => 403,
            AccessError::Store(_) => 503,
            AccessError::Rbac(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::Denied { .. } => "ACCESS_DENIED",
            AccessError::Store(_) => "PROFILE_STORE_ERROR",
            AccessError::Rbac(err) => err.error_code(),
        }
    }
}
