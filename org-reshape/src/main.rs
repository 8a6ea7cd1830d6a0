//! Batch migration tool.
//!
//! Migrates every organization whose `migrated` flag is still `false`, in
//! concurrent batches, then exits.
//!
//! Usage:
//!   org-reshape --batch-size 20 --log-file ./reshape.log --yes
//!
//! Environment variables:
//!   DATABASE_URL - PostgreSQL connection string (required)
//!   DATABASE_MAX_CONNECTIONS - Pool size (default: 5)
//!   MIGRATION_BATCH_SIZE - Organizations per batch (default: 10)
//!   MIGRATION_LOG_FILE - Duplicate log output to this file
//!   MISSING_PREREQUISITE_POLICY - halt | continue (default: halt)
//!   LOG_FORMAT - json for structured console output
use clap::Parser;
use dotenv::dotenv;
use org_reshape::logging::init_tracing;
use org_reshape::prompt::confirm;
use org_reshape::{Dependencies, ReshapeError, Settings};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "org-reshape")]
#[command(about = "Migrate every pending organization from members and teams to spaces")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    yes: bool,
}

#[tokio::main]
async fn main() -> Result<(), ReshapeError> {
    dotenv().ok();
    let cli = Cli::parse();

    let _guard = init_tracing(cli.settings.log_file.as_deref())?;
    info!(
        service_name = "org-reshape",
        service_version = env!("CARGO_PKG_VERSION"),
        batch_size = cli.settings.batch_size,
        policy = %cli.settings.policy,
        "Starting organization migration"
    );

    if !cli.yes {
        let confirmed = confirm("Migrate every organization that has not been migrated yet?")?;
        if !confirmed {
            warn!("Migration cancelled by operator");
            return Ok(());
        }
    }

    let dependencies = match Dependencies::new(&cli.settings).await {
        Ok(dependencies) => dependencies,
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let summary = dependencies.orchestrator.run().await?;
    for (organization_id, reason) in &summary.failed {
        error!(organization_id, reason = %reason, "Organization left unmigrated");
    }
    info!(
        batches = summary.batches,
        migrated = summary.migrated.len(),
        failed = summary.failed.len(),
        "Organization migration completed"
    );
    Ok(())
}
