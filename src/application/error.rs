//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::error::describe_io;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("hierarchy session is not open")]
    SessionNotOpen,

    #[error("permissions have not been loaded")]
    PermissionsNotLoaded,

    #[error("config error: {message}")]
    Config { message: String },

    #[error("fetch failed: {context}")]
    Fetch {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// Short message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            ApplicationError::Fetch { context, source } => {
                format!("could not load {context}: {}", describe_io(source))
            }
            ApplicationError::Domain(DomainError::NodeNotFound(id)) => {
                format!("'{id}' is not part of the loaded hierarchy")
            }
            other => other.to_string(),
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
