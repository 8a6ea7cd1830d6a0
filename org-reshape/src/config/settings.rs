use std::path::PathBuf;

use clap::Args;
use org_reshape_pipeline::{
    DEFAULT_BATCH_SIZE, JobConfig, MissingPrerequisitePolicy, OrchestratorConfig,
};

/// Operator settings shared by both tools.
///
/// Every option can come from a flag or from the environment (including a
/// `.env` file loaded before parsing). Flags win.
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Maximum pooled database connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Organizations migrated concurrently per batch
    #[arg(
        long,
        env = "MIGRATION_BATCH_SIZE",
        default_value_t = DEFAULT_BATCH_SIZE,
        value_parser = parse_batch_size
    )]
    pub batch_size: usize,

    /// Duplicate log output to this file
    #[arg(long, env = "MIGRATION_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// What to do when a member or team lacks required data (halt | continue)
    #[arg(long, env = "MISSING_PREREQUISITE_POLICY", default_value_t = MissingPrerequisitePolicy::Halt)]
    pub policy: MissingPrerequisitePolicy,
}

impl Settings {
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            batch_size: self.batch_size,
            job: JobConfig {
                policy: self.policy,
                ..JobConfig::default()
            },
        }
    }
}

fn parse_batch_size(value: &str) -> Result<usize, String> {
    let batch_size: usize = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a positive integer", value))?;
    if batch_size == 0 {
        return Err("batch size must be at least 1".to_string());
    }
    Ok(batch_size)
}
