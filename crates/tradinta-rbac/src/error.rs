//! Error types for access-control configuration
//!
//! Permission resolution itself never fails: unknown roles, unknown
//! permissions and exhausted inheritance all resolve to a denial. The errors
//! here cover building and validating the configuration the resolver runs on.

use thiserror::Error;

/// Errors raised while parsing permissions or loading access configuration.
#[derive(Debug, Error)]
pub enum RbacError {
    /// A permission string is not of the form `resource:action[:scope]`.
    #[error("Invalid permission '{0}': expected resource:action or resource:action:scope")]
    InvalidPermission(String),

    /// The role registry is inconsistent with the permission catalogue.
    #[error("Invalid role registry: {}", format_issues(.issues))]
    InvalidRegistry {
        /// Every problem found, in registry order.
        issues: Vec<RegistryIssue>,
    },

    /// Configuration is structurally valid JSON but semantically wrong.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration could not be parsed.
    #[error("Failed to parse access configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("Failed to read access configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for access-control configuration operations.
pub type RbacResult<T> = Result<T, RbacError>;

/// A single consistency problem in a role registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryIssue {
    /// A role inherits from a key that is not in the registry.
    #[error("role '{role}' inherits unknown role '{inherits}'")]
    DanglingInheritance {
        /// The inheriting role.
        role: String,
        /// The missing role key.
        inherits: String,
    },

    /// A role grants a permission the catalogue does not define.
    #[error("role '{role}' grants uncatalogued permission '{permission}'")]
    UncataloguedPermission {
        /// The granting role.
        role: String,
        /// The unknown permission string.
        permission: String,
    },

    /// Roles inherit from each other in a loop.
    #[error("inheritance cycle: {}", .0.join(" -> "))]
    InheritanceCycle(Vec<String>),
}

fn format_issues(issues: &[RegistryIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl RbacError {
    /// Get error code for API responses and logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            RbacError::InvalidPermission(_) => "INVALID_PERMISSION",
            RbacError::InvalidRegistry { .. } => "INVALID_REGISTRY",
            RbacError::Config(_) => "CONFIG_ERROR",
            RbacError::Parse(_) => "CONFIG_PARSE_ERROR",
            RbacError::Io(_) => "CONFIG_IO_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_registry_message_lists_every_issue() {
        let err = RbacError::InvalidRegistry {
            issues: vec![
                RegistryIssue::DanglingInheritance {
                    role: "admin".to_string(),
                    inherits: "ops".to_string(),
                },
                RegistryIssue::InheritanceCycle(vec![
                    "a".to_string(),
                    "b".to_string(),
                    "a".to_string(),
                ]),
            ],
        };

        let message = err.to_string();
        assert!(message.contains("role 'admin' inherits unknown role 'ops'"));
        assert!(message.contains("inheritance cycle: a -> b -> a"));
        assert_eq!(err.error_code(), "INVALID_REGISTRY");
    }

    #[test]
    fn test_parse_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: RbacError = parse.into();
        assert_eq!(err.error_code(), "CONFIG_PARSE_ERROR");
    }
}
