//! Error types for the reshape tools.
//! Consolidates errors from configuration, logging setup, the store and the
//! orchestrator.
use org_reshape_pipeline::errors::OrchestratorError;
use org_reshape_repository::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum ReshapeError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Logging setup error: {0}")]
    Logging(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}
