//! Error types for the migration orchestrator.
use org_reshape_repository::RepositoryError;
use thiserror::Error;
use crate::errors::MigrationError;

/// Errors that abort a whole orchestrator run.
///
/// Failures of individual organizations are not surfaced here; they are logged
/// and collected in `RunSummary::failed`.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    #[error("Invalid batch size: {0} (must be at least 1)")]
    InvalidBatchSize(usize),
}
