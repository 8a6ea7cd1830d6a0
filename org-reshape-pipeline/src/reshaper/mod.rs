//! Per-member and per-team reshaping steps.
//!
//! A [`Reshaper`] turns one member into a personal space, or one team into a
//! team space, and moves the related conversations and mail routing over to
//! it. Steps run strictly in order and every store call is awaited before the
//! next one starts. Nothing is wrapped in a transaction: a store error part
//! way through leaves the earlier writes in place.
mod member;
mod team;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use org_reshape_repository::MigrationRepository;
use org_reshape_shared::types::{
    ConversationSpaceLink, EmailIdentityId, MailRoutingDestination, MemberId, NewSpace,
    NewSpaceMembership, OrganizationId, ParticipantOwner, SpaceId, SpacePermissions, SpaceRole,
    TeamId,
};
use tracing::warn;

use crate::errors::MigrationError;
use crate::job::MissingPrerequisitePolicy;
use crate::logging::ProgressLog;
use crate::pager::ConversationPager;
use crate::shortcode::allocate_shortcode;

pub const DEFAULT_SPACE_COLOR: &str = "#5b6cff";
pub const PERSONAL_SPACE_ICON: &str = "user";
pub const TEAM_SPACE_ICON: &str = "users";

/// State shared by every reshaping step of one organization.
///
/// Owned by a single job future, so the consumed set is never shared between
/// organizations.
#[derive(Debug, Clone)]
pub struct OrgContext {
    pub organization_id: OrganizationId,
    /// Recorded as `created_by` / `added_by` on everything the migration creates.
    pub owner_id: MemberId,
    pub consumed: HashSet<String>,
}

impl OrgContext {
    pub fn new(organization_id: OrganizationId, owner_id: MemberId) -> Self {
        Self {
            organization_id,
            owner_id,
            consumed: HashSet::new(),
        }
    }

    /// Seeds the consumed set with shortcodes that already exist.
    pub fn with_consumed<I>(mut self, shortcodes: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.consumed.extend(shortcodes);
        self
    }
}

/// Data a reshaping step needed but could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPrerequisite {
    MemberProfile(MemberId),
    MemberHandle(MemberId),
    Team(TeamId),
    TeamName(TeamId),
    RoutingDestinations(ParticipantOwner),
}

impl fmt::Display for MissingPrerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingPrerequisite::MemberProfile(id) => write!(f, "member {} has no profile", id),
            MissingPrerequisite::MemberHandle(id) => write!(f, "member {} has no handle", id),
            MissingPrerequisite::Team(id) => write!(f, "team {} not found", id),
            MissingPrerequisite::TeamName(id) => write!(f, "team {} has no name", id),
            MissingPrerequisite::RoutingDestinations(owner) => {
                write!(f, "no routing destinations for {}", owner)
            }
        }
    }
}

/// What a fully processed member or team produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReshapedEntity {
    pub space_id: SpaceId,
    pub shortcode: String,
    pub conversations: usize,
    pub destinations: usize,
    pub default_email_identity_id: Option<EmailIdentityId>,
}

/// Result of reshaping a single member or team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Migrated(ReshapedEntity),
    /// The entity already pointed at a space from an earlier run. Conversation
    /// links and destinations were brought up to date.
    AlreadyMigrated(SpaceId),
    MissingPrerequisite(MissingPrerequisite),
}

/// Allocates a shortcode and records it in the consumed set.
fn claim_shortcode(context: &mut OrgContext, base: &str, log: &dyn ProgressLog) -> String {
    let shortcode = allocate_shortcode(base, &context.consumed);
    if context.consumed.contains(&shortcode) {
        warn!(
            organization_id = context.organization_id,
            base,
            shortcode = %shortcode,
            "Shortcode candidates exhausted, using a colliding value"
        );
        log.log(&format!(
            "Organization {}: shortcode candidates for '{}' exhausted, '{}' still collides",
            context.organization_id, base, shortcode
        ));
    }
    context.consumed.insert(shortcode.clone());
    shortcode
}

/// Runs the member and team step sequences against a repository.
pub struct Reshaper {
    repository: Arc<dyn MigrationRepository>,
    pager: ConversationPager,
    policy: MissingPrerequisitePolicy,
}

impl Reshaper {
    pub fn new(
        repository: Arc<dyn MigrationRepository>,
        page_size: i64,
        policy: MissingPrerequisitePolicy,
    ) -> Self {
        Self {
            pager: ConversationPager::with_page_size(repository.clone(), page_size),
            repository,
            policy,
        }
    }

    /// Inserts `space` and an admin membership for `member_id` in it.
    async fn create_space_with_admin(
        &self,
        context: &OrgContext,
        space: NewSpace,
        member_id: MemberId,
    ) -> Result<SpaceId, MigrationError> {
        let space_id = self.repository.insert_space(&space).await?;
        self.repository
            .insert_space_membership(&NewSpaceMembership {
                organization_id: context.organization_id,
                space_id,
                member_id,
                role: SpaceRole::Admin,
                permissions: SpacePermissions::all(),
                added_by: context.owner_id,
            })
            .await?;
        Ok(space_id)
    }

    /// Reads the first email identity of the first destination's rule.
    async fn default_identity(
        &self,
        destinations: &[MailRoutingDestination],
    ) -> Result<Option<EmailIdentityId>, MigrationError> {
        match destinations.first() {
            Some(destination) => Ok(self
                .repository
                .first_rule_email_identity(destination.rule_id)
                .await?),
            None => Ok(None),
        }
    }

    /// Links every conversation of `owner` to `space_id`. Returns the number
    /// of links written.
    async fn link_conversations(
        &self,
        context: &OrgContext,
        owner: ParticipantOwner,
        space_id: SpaceId,
    ) -> Result<usize, MigrationError> {
        let conversation_ids = self.pager.conversation_ids(owner).await?;
        if conversation_ids.is_empty() {
            return Ok(0);
        }

        let links: Vec<ConversationSpaceLink> = conversation_ids
            .into_iter()
            .map(|conversation_id| ConversationSpaceLink {
                organization_id: context.organization_id,
                conversation_id,
                space_id,
            })
            .collect();
        self.repository.insert_conversation_space_links(&links).await?;
        Ok(links.len())
    }

    /// Replays the idempotent tail of a step sequence for an entity whose space
    /// already exists. Completes runs that stopped after the space was created.
    ///
    /// The routing check applies exactly as on a first run: under the halt
    /// policy an owner without destinations is reported and nothing is linked.
    async fn resume(
        &self,
        context: &OrgContext,
        owner: ParticipantOwner,
        space_id: SpaceId,
        log: &dyn ProgressLog,
    ) -> Result<Option<MissingPrerequisite>, MigrationError> {
        let destinations = self.repository.routing_destinations(owner).await?;
        if let Some(missing) = self.check_destinations(context, owner, &destinations, log) {
            return Ok(Some(missing));
        }
        self.link_conversations(context, owner, space_id).await?;
        self.repoint_destinations(&destinations, space_id).await?;
        Ok(None)
    }

    /// Applies the missing-prerequisite policy to an empty destination list.
    /// Returns the prerequisite when the step has to stop.
    fn check_destinations(
        &self,
        context: &OrgContext,
        owner: ParticipantOwner,
        destinations: &[MailRoutingDestination],
        log: &dyn ProgressLog,
    ) -> Option<MissingPrerequisite> {
        if !destinations.is_empty() {
            return None;
        }
        let missing = MissingPrerequisite::RoutingDestinations(owner);
        if self.policy == MissingPrerequisitePolicy::Halt {
            return Some(missing);
        }
        log.log(&format!(
            "Organization {}: {}, migrating conversations only",
            context.organization_id, missing
        ));
        None
    }

    async fn repoint_destinations(
        &self,
        destinations: &[MailRoutingDestination],
        space_id: SpaceId,
    ) -> Result<usize, MigrationError> {
        for destination in destinations {
            self.repository
                .repoint_routing_destination(destination.id, space_id)
                .await?;
        }
        Ok(destinations.len())
    }
}
