//! PostgreSQL backend for the migration repository.
mod migration_repository;

pub use migration_repository::PostgresMigrationRepository;
