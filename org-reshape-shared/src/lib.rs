//! # Org Reshape Shared
//! This crate defines the data structures shared across the organization reshaping
//! workspace: entity identifiers, the rows the migration reads, and the payloads
//! it writes when moving members and teams into spaces.
pub mod types;
