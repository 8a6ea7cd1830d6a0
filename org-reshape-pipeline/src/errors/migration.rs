//! Error types for the organization migration job.
use org_reshape_repository::RepositoryError;
use thiserror::Error;

/// Fatal errors of an organization job.
///
/// Missing prerequisite data is not an error: it is reported through
/// `JobOutcome`. Anything here leaves the organization unmigrated.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Migration task failed: {0}")]
    TaskFailed(String),
}
