//! The per-organization migration job.
//!
//! A job walks `Start → LoadOrg → ProcessMembers → ProcessTeams → Done`, or
//! stops at `Aborted` when the organization cannot be loaded. Members and teams
//! are reshaped one after another; missing prerequisite data stops or skips
//! according to [`MissingPrerequisitePolicy`] but never fails the job. Store
//! errors are returned to the caller.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use org_reshape_repository::MigrationRepository;
use org_reshape_shared::types::{MemberId, OrganizationId, TeamId};
use tracing::{debug, instrument, warn};

use crate::errors::MigrationError;
use crate::logging::ProgressLog;
use crate::pager::DEFAULT_PAGE_SIZE;
use crate::reshaper::{MissingPrerequisite, OrgContext, Reshaper, StepOutcome};

/// States of a job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Start,
    LoadOrg,
    ProcessMembers,
    ProcessTeams,
    Done,
    Aborted,
}

/// What to do when a member or team lacks data the migration needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPrerequisitePolicy {
    /// Stop the current loop. Remaining members (or teams) are left untouched.
    #[default]
    Halt,
    /// Skip the offending member or team and carry on.
    Continue,
}

impl fmt::Display for MissingPrerequisitePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingPrerequisitePolicy::Halt => write!(f, "halt"),
            MissingPrerequisitePolicy::Continue => write!(f, "continue"),
        }
    }
}

impl FromStr for MissingPrerequisitePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "halt" => Ok(MissingPrerequisitePolicy::Halt),
            "continue" => Ok(MissingPrerequisitePolicy::Continue),
            other => Err(format!(
                "unknown missing prerequisite policy '{}' (expected 'halt' or 'continue')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobConfig {
    pub policy: MissingPrerequisitePolicy,
    pub page_size: i64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            policy: MissingPrerequisitePolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Counts for one of the two loops of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Entities visited, including the one that halted the loop.
    pub processed: usize,
    pub migrated: usize,
    /// Already migrated, or skipped under the continue policy.
    pub skipped: usize,
    pub halted_by: Option<MissingPrerequisite>,
}

/// Why a job stopped before processing any member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    OrganizationNotFound,
    OwnerMissing,
    NoMembers,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::OrganizationNotFound => write!(f, "organization not found"),
            AbortReason::OwnerMissing => write!(f, "organization owner not found"),
            AbortReason::NoMembers => write!(f, "organization has no members"),
        }
    }
}

/// Final state of a job that did not hit a store error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Done {
        members: LoopSummary,
        teams: LoopSummary,
    },
    Aborted(AbortReason),
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            JobOutcome::Done { .. } => JobState::Done,
            JobOutcome::Aborted(_) => JobState::Aborted,
        }
    }
}

/// Migrates a single organization.
pub struct OrgMigrationJob {
    repository: Arc<dyn MigrationRepository>,
    reshaper: Reshaper,
    config: JobConfig,
}

impl OrgMigrationJob {
    pub fn new(repository: Arc<dyn MigrationRepository>, config: JobConfig) -> Self {
        Self {
            reshaper: Reshaper::new(repository.clone(), config.page_size, config.policy),
            repository,
            config,
        }
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Runs the job to completion.
    ///
    /// Returns `Ok` for both `Done` and `Aborted`; callers decide whether to
    /// mark the organization migrated.
    #[instrument(skip(self, log))]
    pub async fn run(
        &self,
        organization_id: OrganizationId,
        log: &dyn ProgressLog,
    ) -> Result<JobOutcome, MigrationError> {
        let mut state = JobState::Start;
        let mut context: Option<OrgContext> = None;
        let mut member_ids: Vec<MemberId> = Vec::new();
        let mut abort_reason = AbortReason::OrganizationNotFound;
        let mut members = LoopSummary::default();
        let mut teams = LoopSummary::default();

        loop {
            debug!(?state, "Job state");
            state = match state {
                JobState::Start => {
                    log.log(&format!("Organization {}: starting migration", organization_id));
                    JobState::LoadOrg
                }
                JobState::LoadOrg => match self.load_org(organization_id).await? {
                    Ok((loaded, ids)) => {
                        context = Some(loaded);
                        member_ids = ids;
                        JobState::ProcessMembers
                    }
                    Err(reason) => {
                        abort_reason = reason;
                        JobState::Aborted
                    }
                },
                JobState::ProcessMembers => {
                    if let Some(context) = context.as_mut() {
                        members = self.process_members(context, &member_ids, log).await?;
                    }
                    JobState::ProcessTeams
                }
                JobState::ProcessTeams => {
                    if let Some(context) = context.as_mut() {
                        let team_ids = self.repository.team_ids(organization_id).await?;
                        teams = self.process_teams(context, &team_ids, log).await?;
                    }
                    JobState::Done
                }
                JobState::Done => {
                    log.log(&format!(
                        "Organization {}: done, {} member(s) and {} team(s) migrated",
                        organization_id, members.migrated, teams.migrated
                    ));
                    return Ok(JobOutcome::Done { members, teams });
                }
                JobState::Aborted => {
                    warn!(reason = %abort_reason, "Migration aborted");
                    log.log(&format!(
                        "Organization {}: aborted, {}",
                        organization_id, abort_reason
                    ));
                    return Ok(JobOutcome::Aborted(abort_reason));
                }
            };
        }
    }

    /// Resolves the organization, its member ids and its owner. The inner
    /// `Err` carries the abort reason; the outer one is a store failure.
    async fn load_org(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Result<(OrgContext, Vec<MemberId>), AbortReason>, MigrationError> {
        let Some(organization) = self.repository.find_organization(organization_id).await? else {
            return Ok(Err(AbortReason::OrganizationNotFound));
        };

        let member_ids = self.repository.member_ids(organization_id).await?;
        if member_ids.is_empty() {
            return Ok(Err(AbortReason::NoMembers));
        }

        let owner_id = match organization.owner_id {
            Some(owner_id) if member_ids.contains(&owner_id) => owner_id,
            _ => return Ok(Err(AbortReason::OwnerMissing)),
        };

        let existing = self.repository.space_shortcodes(organization_id).await?;
        let context = OrgContext::new(organization_id, owner_id).with_consumed(existing);
        Ok(Ok((context, member_ids)))
    }

    async fn process_members(
        &self,
        context: &mut OrgContext,
        member_ids: &[MemberId],
        log: &dyn ProgressLog,
    ) -> Result<LoopSummary, MigrationError> {
        let mut summary = LoopSummary::default();
        for &member_id in member_ids {
            summary.processed += 1;
            let outcome = self.reshaper.reshape_member(context, member_id, log).await?;
            if !self.record(&mut summary, outcome, context.organization_id, "member", log) {
                break;
            }
        }
        Ok(summary)
    }

    async fn process_teams(
        &self,
        context: &mut OrgContext,
        team_ids: &[TeamId],
        log: &dyn ProgressLog,
    ) -> Result<LoopSummary, MigrationError> {
        let mut summary = LoopSummary::default();
        for &team_id in team_ids {
            summary.processed += 1;
            let outcome = self.reshaper.reshape_team(context, team_id, log).await?;
            if !self.record(&mut summary, outcome, context.organization_id, "team", log) {
                break;
            }
        }
        Ok(summary)
    }

    /// Folds one step outcome into `summary`. Returns `false` when the loop
    /// must stop.
    fn record(
        &self,
        summary: &mut LoopSummary,
        outcome: StepOutcome,
        organization_id: OrganizationId,
        kind: &str,
        log: &dyn ProgressLog,
    ) -> bool {
        match outcome {
            StepOutcome::Migrated(_) => {
                summary.migrated += 1;
                true
            }
            StepOutcome::AlreadyMigrated(_) => {
                summary.skipped += 1;
                true
            }
            StepOutcome::MissingPrerequisite(missing) => match self.config.policy {
                MissingPrerequisitePolicy::Halt => {
                    warn!(organization_id, %missing, "Missing prerequisite, halting {} loop", kind);
                    log.log(&format!(
                        "Organization {}: {}, halting {} processing",
                        organization_id, missing, kind
                    ));
                    summary.halted_by = Some(missing);
                    false
                }
                MissingPrerequisitePolicy::Continue => {
                    warn!(organization_id, %missing, "Missing prerequisite, skipping {}", kind);
                    log.log(&format!(
                        "Organization {}: {}, skipping {}",
                        organization_id, missing, kind
                    ));
                    summary.skipped += 1;
                    true
                }
            },
        }
    }
}
