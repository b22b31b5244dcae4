//! `PostgreSQL` storage backends for the MallBots event-sourced aggregates.
//!
//! The schema lives in the workspace `migrations/` directory and is applied by
//! the host with `sqlx::migrate!`.

pub mod pg_event_storage;
pub mod pg_snapshot_storage;

use mallbots_core::error::DomainError;

fn storage_error(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("postgres: {err}"))
}
