//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),

    #[error("hierarchy check failed: {0}")]
    Validation(String),

    #[error("missing permission: {0}")]
    Denied(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        ApplicationError::from(e).into()
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Message shown to the user on stderr.
    pub fn user_message(&self) -> String {
        match self {
            CliError::Infra(e) => e.user_message(),
            other => other.to_string(),
        }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Validation(_) => crate::exitcode::DATAERR,
            CliError::Denied(_) => crate::exitcode::NOPERM,
            CliError::Infra(e) => match e {
                InfraError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                    crate::exitcode::NOINPUT
                }
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Parse { .. } => crate::exitcode::DATAERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::Fetch { .. } => crate::exitcode::UNAVAILABLE,
                    ApplicationError::Domain(DomainError::InvalidPattern { .. }) => {
                        crate::exitcode::USAGE
                    }
                    ApplicationError::Domain(_) => crate::exitcode::DATAERR,
                    _ => crate::exitcode::SOFTWARE,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_error_kinds_when_mapping_then_uses_sysexits() {
        let not_found = CliError::from(InfraError::io(
            "read listing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        ));
        assert_eq!(not_found.exit_code(), crate::exitcode::NOINPUT);

        let unknown = CliError::from(ApplicationError::Domain(DomainError::NodeNotFound("X".into())));
        assert_eq!(unknown.exit_code(), crate::exitcode::DATAERR);
        assert_eq!(unknown.user_message(), "'X' is not part of the loaded hierarchy");

        assert_eq!(CliError::Usage("x".into()).exit_code(), crate::exitcode::USAGE);
    }
}
