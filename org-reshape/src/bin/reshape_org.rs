//! Single-organization migration tool.
//!
//! Runs the migration job for one organization and exits. The organization's
//! `migrated` flag is left untouched unless `--mark-migrated` is given.
//!
//! Usage:
//!   reshape-org 42 --mark-migrated
use clap::Parser;
use dotenv::dotenv;
use org_reshape::logging::init_tracing;
use org_reshape::{Dependencies, ReshapeError, Settings};
use org_reshape_pipeline::JobOutcome;
use org_reshape_shared::types::OrganizationId;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "reshape-org")]
#[command(about = "Migrate a single organization from members and teams to spaces")]
#[command(version)]
struct Cli {
    /// Organization to migrate
    organization_id: OrganizationId,

    /// Set the organization's migrated flag after a successful run
    #[arg(long)]
    mark_migrated: bool,

    #[command(flatten)]
    settings: Settings,
}

#[tokio::main]
async fn main() -> Result<(), ReshapeError> {
    dotenv().ok();
    let cli = Cli::parse();

    let _guard = init_tracing(cli.settings.log_file.as_deref())?;
    info!(
        organization_id = cli.organization_id,
        mark_migrated = cli.mark_migrated,
        policy = %cli.settings.policy,
        "Starting single organization migration"
    );

    let dependencies = match Dependencies::new(&cli.settings).await {
        Ok(dependencies) => dependencies,
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match dependencies
        .orchestrator
        .run_single(cli.organization_id, cli.mark_migrated)
        .await?
    {
        JobOutcome::Done { members, teams } => info!(
            organization_id = cli.organization_id,
            members_migrated = members.migrated,
            teams_migrated = teams.migrated,
            "Organization migration completed"
        ),
        JobOutcome::Aborted(reason) => warn!(
            organization_id = cli.organization_id,
            reason = %reason,
            "Organization migration aborted"
        ),
    }
    Ok(())
}
