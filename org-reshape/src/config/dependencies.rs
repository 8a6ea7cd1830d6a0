use std::sync::Arc;

use org_reshape_pipeline::{MigrationOrchestrator, ProgressLog, TracingProgressLog};
use org_reshape_repository::PostgresMigrationRepository;
use tracing::info;

use crate::config::Settings;
use crate::errors::ReshapeError;

/// `Dependencies` holds the orchestrator both tools drive, wired to the
/// PostgreSQL store.
pub struct Dependencies {
    pub orchestrator: MigrationOrchestrator,
}

impl Dependencies {
    /// Connects to the database, applies the schema migrations and builds the
    /// orchestrator.
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok(Self)` on successful initialization or a
    /// `ReshapeError` if the database is unreachable or the settings are
    /// rejected by the orchestrator.
    pub async fn new(settings: &Settings) -> Result<Self, ReshapeError> {
        let repository =
            PostgresMigrationRepository::connect(&settings.database_url, settings.max_connections)
                .await?;
        repository.run_migrations().await?;
        let repository = Arc::new(repository);
        info!(max_connections = settings.max_connections, "Database ready");

        let log: Arc<dyn ProgressLog> = Arc::new(TracingProgressLog);
        let orchestrator =
            MigrationOrchestrator::new(repository, log, settings.orchestrator_config())?;

        Ok(Dependencies { orchestrator })
    }
}
