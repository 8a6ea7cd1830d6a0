//! # Org Reshape Repository
//! This crate provides the store interface used by the organization reshaping
//! pipeline. It includes the error type, the `MigrationRepository` trait and a
//! concrete implementation for PostgreSQL.
pub mod errors;
pub mod interfaces;
pub mod postgres;

pub use errors::RepositoryError;
pub use interfaces::MigrationRepository;
pub use postgres::PostgresMigrationRepository;
