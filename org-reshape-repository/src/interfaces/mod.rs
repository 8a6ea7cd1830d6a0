//! This module defines and re-exports the interfaces for the migration repository.
mod migration_repository;

pub use migration_repository::MigrationRepository;
