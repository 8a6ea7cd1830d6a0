//! Configuration module for the reshape tools.
//! Defines the operator settings and the dependencies built from them.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::Settings;
