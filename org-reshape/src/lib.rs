//! Org Reshape Library
//!
//! Configuration, dependency wiring, logging setup and error types shared by
//! the `org-reshape` batch tool and the `reshape-org` single-organization tool.

pub mod config;
pub mod errors;
pub mod logging;
pub mod prompt;

pub use config::{Dependencies, Settings};
pub use errors::ReshapeError;
