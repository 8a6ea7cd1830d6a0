//! Errors raised by store operations.
use thiserror::Error;

/// Represents errors that can occur within the migration repository.
///
/// Every variant is fatal for the organization being migrated: the pipeline
/// propagates it, and the orchestrator leaves the organization unmigrated so the
/// next run retries it.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Schema migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Row not found: {0}")]
    NotFound(String),

    #[error("Invalid pagination window: limit={limit}, offset={offset}")]
    InvalidPage { limit: i64, offset: i64 },
}
