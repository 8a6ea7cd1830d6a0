mod migration;
mod orchestrator;

pub use migration::MigrationError;
pub use orchestrator::OrchestratorError;
