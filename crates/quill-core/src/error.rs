//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures surfaced to the caller.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} {key}")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    /// The caller is not authenticated.
    #[error("Authentication required")]
    Unauthorized,

    /// The caller is authenticated but may not perform the action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            key: key.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    /// A unique column (email, slug) already holds the value.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A referenced row (owner, post, parent comment) does not exist.
    #[error("Foreign key violated: {0}")]
    ForeignKey(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::UniqueViolation(msg) => DomainError::Duplicate(msg),
            RepoError::ForeignKey(msg) => DomainError::Validation(msg),
            RepoError::NotFound => DomainError::not_found("record", "(vanished)"),
            RepoError::Connection(msg) | RepoError::Query(msg) => DomainError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_becomes_duplicate() {
        let err: DomainError = RepoError::UniqueViolation("slug taken".to_string()).into();
        assert!(matches!(err, DomainError::Duplicate(msg) if msg == "slug taken"));
    }

    #[test]
    fn missing_reference_is_not_a_duplicate() {
        let err: DomainError = RepoError::ForeignKey("no such user".to_string()).into();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn query_failure_becomes_internal() {
        let err: DomainError = RepoError::Query("timeout".to_string()).into();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
