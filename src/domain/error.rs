//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of hierarchy rules.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("invalid search pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("unknown domain type: {0}")]
    UnknownDomainType(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
