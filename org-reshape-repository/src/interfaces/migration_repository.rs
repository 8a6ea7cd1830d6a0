//! This module defines the `MigrationRepository` trait, the store interface the
//! reshaping pipeline reads from and writes to.
//!
//! Every operation is a single request/response against the store. The pipeline
//! never opens transactions through this interface.
use crate::errors::RepositoryError;
use org_reshape_shared::types::{
    ConversationId, ConversationSpaceLink, EmailIdentityId, MailRoutingDestination, MemberId,
    MemberProfile, NewSpace, NewSpaceMembership, Organization, OrganizationId, ParticipantOwner,
    RoutingDestinationId, RoutingRuleId, SpaceId, SpaceMembershipId, Team, TeamId,
};

/// A trait that defines the interface for interacting with the organization store.
///
/// Implementors provide lookups for organizations, members, teams and their
/// related rows, and the handful of inserts/updates the migration performs.
#[async_trait::async_trait]
pub trait MigrationRepository: Send + Sync {
    /// Returns every organization whose `migrated` flag is still `false`,
    /// ordered by id.
    async fn unmigrated_organizations(&self) -> Result<Vec<Organization>, RepositoryError>;

    /// Looks up a single organization.
    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<Organization>, RepositoryError>;

    /// Sets the organization's `migrated` flag to `true`.
    async fn mark_organization_migrated(
        &self,
        organization_id: OrganizationId,
    ) -> Result<(), RepositoryError>;

    /// Lists the ids of every member of the organization, ordered by id.
    async fn member_ids(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<MemberId>, RepositoryError>;

    /// Lists the ids of every team of the organization, ordered by id.
    async fn team_ids(&self, organization_id: OrganizationId) -> Result<Vec<TeamId>, RepositoryError>;

    /// Loads a member together with its profile. `None` when the member or its
    /// profile row does not exist.
    async fn find_member_profile(
        &self,
        member_id: MemberId,
    ) -> Result<Option<MemberProfile>, RepositoryError>;

    /// Loads a team row.
    async fn find_team(&self, team_id: TeamId) -> Result<Option<Team>, RepositoryError>;

    /// Returns every shortcode already used by a space of the organization.
    async fn space_shortcodes(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<String>, RepositoryError>;

    /// Returns the shortcodes of the organization that start with `prefix`.
    async fn shortcodes_with_prefix(
        &self,
        organization_id: OrganizationId,
        prefix: &str,
    ) -> Result<Vec<String>, RepositoryError>;

    /// Inserts a space and returns its generated id.
    async fn insert_space(&self, space: &NewSpace) -> Result<SpaceId, RepositoryError>;

    /// Inserts a space membership and returns its generated id.
    async fn insert_space_membership(
        &self,
        membership: &NewSpaceMembership,
    ) -> Result<SpaceMembershipId, RepositoryError>;

    /// Points the member's personal space reference at `space_id`.
    async fn set_member_personal_space(
        &self,
        member_id: MemberId,
        space_id: SpaceId,
    ) -> Result<(), RepositoryError>;

    /// Sets the member's default email identity.
    async fn set_member_default_email_identity(
        &self,
        member_id: MemberId,
        email_identity_id: EmailIdentityId,
    ) -> Result<(), RepositoryError>;

    /// Sets the team's default space and, when given, its default email identity.
    async fn set_team_defaults(
        &self,
        team_id: TeamId,
        space_id: SpaceId,
        email_identity_id: Option<EmailIdentityId>,
    ) -> Result<(), RepositoryError>;

    /// Loads every routing destination currently pointing at `owner`, ordered by id.
    async fn routing_destinations(
        &self,
        owner: ParticipantOwner,
    ) -> Result<Vec<MailRoutingDestination>, RepositoryError>;

    /// Returns the first email identity associated with a routing rule, if any.
    async fn first_rule_email_identity(
        &self,
        rule_id: RoutingRuleId,
    ) -> Result<Option<EmailIdentityId>, RepositoryError>;

    /// Returns one page of conversation ids linked to `owner` through the
    /// participant relation. Pages are ordered by participant row id so
    /// consecutive offsets never overlap.
    async fn participant_conversation_ids(
        &self,
        owner: ParticipantOwner,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ConversationId>, RepositoryError>;

    /// Inserts conversation/space links. Empty slices are no-ops.
    async fn insert_conversation_space_links(
        &self,
        links: &[ConversationSpaceLink],
    ) -> Result<(), RepositoryError>;

    /// Points a routing destination at `space_id` and clears its member and
    /// team references.
    async fn repoint_routing_destination(
        &self,
        destination_id: RoutingDestinationId,
        space_id: SpaceId,
    ) -> Result<(), RepositoryError>;
}
