//! MallBots monolith: startup and runtime error types.

use mallbots_core::error::DomainError;
use thiserror::Error;

/// Startup and runtime errors for the monolith.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failure.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A module failed to start.
    #[error("module startup error: {0}")]
    Startup(#[from] DomainError),

    /// Signal handling or other I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_the_problem() {
        let err = AppError::Config("SNAPSHOT_EVERY must be a number".into());

        assert_eq!(
            err.to_string(),
            "configuration error: SNAPSHOT_EVERY must be a number"
        );
    }

    #[test]
    fn test_domain_error_converts_to_startup_error() {
        let err: AppError = DomainError::Registry("duplicate".into()).into();

        assert!(matches!(err, AppError::Startup(DomainError::Registry(_))));
    }
}
