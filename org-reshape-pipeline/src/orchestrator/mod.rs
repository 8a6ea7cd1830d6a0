//! This module defines the `MigrationOrchestrator`, which drives the
//! organization job over every organization that has not been migrated yet.
//!
//! Organizations are processed in sequential batches. Inside a batch every
//! organization gets its own tokio task, and the batch finishes when all of
//! them have been joined. Each successful job marks its organization migrated;
//! a failed job is logged and its organization stays pending for the next run.
use std::sync::Arc;

use futures::future::join_all;
use org_reshape_repository::MigrationRepository;
use org_reshape_shared::types::OrganizationId;
use tracing::{error, info, instrument};

use crate::errors::{MigrationError, OrchestratorError};
use crate::job::{JobConfig, JobOutcome, OrgMigrationJob};
use crate::logging::{BatchLog, ProgressLog};

/// Organizations migrated concurrently per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub batch_size: usize,
    pub job: JobConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            job: JobConfig::default(),
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: usize,
    pub migrated: Vec<OrganizationId>,
    pub failed: Vec<(OrganizationId, String)>,
}

impl RunSummary {
    pub fn processed(&self) -> usize {
        self.migrated.len() + self.failed.len()
    }
}

/// `MigrationOrchestrator` selects pending organizations and runs the
/// organization job over them.
pub struct MigrationOrchestrator {
    repository: Arc<dyn MigrationRepository>,
    job: Arc<OrgMigrationJob>,
    log: Arc<dyn ProgressLog>,
    config: OrchestratorConfig,
}

impl MigrationOrchestrator {
    /// Creates a new `MigrationOrchestrator`.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidBatchSize` when `config.batch_size`
    /// is zero.
    pub fn new(
        repository: Arc<dyn MigrationRepository>,
        log: Arc<dyn ProgressLog>,
        config: OrchestratorConfig,
    ) -> Result<Self, OrchestratorError> {
        if config.batch_size == 0 {
            return Err(OrchestratorError::InvalidBatchSize(config.batch_size));
        }
        Ok(Self {
            job: Arc::new(OrgMigrationJob::new(repository.clone(), config.job)),
            repository,
            log,
            config,
        })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Migrates every organization whose `migrated` flag is `false`.
    ///
    /// Only the initial selection can fail the run. Per-organization failures
    /// end up in `RunSummary::failed`.
    #[instrument(skip(self), fields(batch_size = self.config.batch_size))]
    pub async fn run(&self) -> Result<RunSummary, OrchestratorError> {
        let organization_ids: Vec<OrganizationId> = self
            .repository
            .unmigrated_organizations()
            .await?
            .into_iter()
            .map(|organization| organization.id)
            .collect();

        self.log.log(&format!(
            "Found {} organization(s) to migrate",
            organization_ids.len()
        ));

        let mut summary = RunSummary::default();
        for batch in organization_ids.chunks(self.config.batch_size) {
            summary.batches += 1;
            self.run_batch(batch, &mut summary).await;
        }

        info!(
            batches = summary.batches,
            migrated = summary.migrated.len(),
            failed = summary.failed.len(),
            "Migration run finished"
        );
        Ok(summary)
    }

    /// Runs the job for one organization without the batch machinery.
    ///
    /// The migrated flag is only written when `mark_migrated` is set.
    #[instrument(skip(self))]
    pub async fn run_single(
        &self,
        organization_id: OrganizationId,
        mark_migrated: bool,
    ) -> Result<JobOutcome, OrchestratorError> {
        let outcome = self.job.run(organization_id, self.log.as_ref()).await?;
        if mark_migrated {
            self.repository
                .mark_organization_migrated(organization_id)
                .await?;
            self.log.log(&format!(
                "Organization {}: marked as migrated",
                organization_id
            ));
        }
        Ok(outcome)
    }

    async fn run_batch(&self, batch: &[OrganizationId], summary: &mut RunSummary) {
        let log = Arc::new(BatchLog::new(self.log.clone()));
        let batch_id = log.batch_id();
        info!(%batch_id, organizations = batch.len(), "Starting batch");
        log.log(&format!("Starting batch of {} organization(s)", batch.len()));

        let handles: Vec<_> = batch
            .iter()
            .map(|&organization_id| {
                let job = self.job.clone();
                let repository = self.repository.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    migrate_organization(job, repository, organization_id, log.as_ref()).await
                })
            })
            .collect();

        let results = join_all(handles).await;
        for (&organization_id, result) in batch.iter().zip(results) {
            let result = result
                .map_err(|e| MigrationError::TaskFailed(e.to_string()))
                .and_then(|inner| inner);
            match result {
                Ok(()) => summary.migrated.push(organization_id),
                Err(e) => {
                    error!(%batch_id, organization_id, error = %e, "Organization migration failed");
                    log.log(&format!(
                        "Organization {}: migration failed, {}",
                        organization_id, e
                    ));
                    summary.failed.push((organization_id, e.to_string()));
                }
            }
        }
    }
}

/// Runs the job and marks the organization migrated when it returns `Ok`.
async fn migrate_organization(
    job: Arc<OrgMigrationJob>,
    repository: Arc<dyn MigrationRepository>,
    organization_id: OrganizationId,
    log: &dyn ProgressLog,
) -> Result<(), MigrationError> {
    job.run(organization_id, log).await?;
    repository
        .mark_organization_migrated(organization_id)
        .await?;
    log.log(&format!(
        "Organization {}: marked as migrated",
        organization_id
    ));
    Ok(())
}
