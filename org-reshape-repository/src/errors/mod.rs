//! Error types for the org reshape repository.
mod repository;

pub use repository::RepositoryError;
