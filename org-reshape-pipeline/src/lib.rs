//! # Org Reshape Pipeline
//! This crate implements the migration that moves an organization's members and
//! teams into spaces.
//!
//! ## Modules
//!
//! - [`shortcode`]: collision-free space shortcodes (migration and live variants)
//! - [`pager`]: offset/limit paging of a member's or team's conversations
//! - [`reshaper`]: the per-member and per-team step sequences
//! - [`job`]: the per-organization migration job
//! - [`orchestrator`]: batching and concurrent execution of jobs
//! - [`logging`]: the injected progress log
//! - [`errors`]: error types for the pipeline
pub mod errors;
pub mod job;
pub mod logging;
pub mod orchestrator;
pub mod pager;
pub mod reshaper;
pub mod shortcode;

pub use errors::{MigrationError, OrchestratorError};
pub use job::{
    AbortReason, JobConfig, JobOutcome, JobState, LoopSummary, MissingPrerequisitePolicy,
    OrgMigrationJob,
};
pub use logging::{BatchLog, ProgressLog, TracingProgressLog};
pub use orchestrator::{DEFAULT_BATCH_SIZE, MigrationOrchestrator, OrchestratorConfig, RunSummary};
pub use pager::{ConversationPager, DEFAULT_PAGE_SIZE};
pub use reshaper::{MissingPrerequisite, OrgContext, ReshapedEntity, Reshaper, StepOutcome};
pub use shortcode::{allocate_live_shortcode, allocate_shortcode};
