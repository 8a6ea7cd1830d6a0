//! Shared fixtures for the pipeline integration tests: an in-memory
//! `MigrationRepository` and a progress log that records every line.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use org_reshape_pipeline::ProgressLog;
use org_reshape_repository::{MigrationRepository, RepositoryError};
use org_reshape_shared::types::{
    ConversationId, ConversationSpaceLink, EmailIdentityId, MailRoutingDestination, MemberId,
    MemberProfile, NewSpace, NewSpaceMembership, Organization, OrganizationId, ParticipantOwner,
    RoutingDestinationId, RoutingRuleId, SpaceId, SpaceMembershipId, Team, TeamId,
};

#[derive(Default)]
pub struct State {
    pub organizations: BTreeMap<OrganizationId, Organization>,
    pub members: Vec<(MemberId, OrganizationId)>,
    pub profiles: HashMap<MemberId, MemberProfile>,
    pub teams: BTreeMap<TeamId, Team>,
    pub spaces: Vec<(SpaceId, NewSpace)>,
    pub memberships: Vec<(SpaceMembershipId, NewSpaceMembership)>,
    pub participants: Vec<(ConversationId, ParticipantOwner)>,
    pub links: Vec<ConversationSpaceLink>,
    pub destinations: Vec<MailRoutingDestination>,
    pub rule_identities: HashMap<RoutingRuleId, Vec<EmailIdentityId>>,
    pub participant_fetches: usize,
    pub failing_organizations: HashSet<OrganizationId>,
    pub failing_shortcodes: HashSet<String>,
    pub failing_pages: HashSet<(ParticipantOwner, i64)>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        1_000 + self.next_id
    }

    pub fn space(&self, space_id: SpaceId) -> Option<&NewSpace> {
        self.spaces
            .iter()
            .find(|(id, _)| *id == space_id)
            .map(|(_, space)| space)
    }

    pub fn links_for(&self, space_id: SpaceId) -> Vec<ConversationId> {
        self.links
            .iter()
            .filter(|link| link.space_id == space_id)
            .map(|link| link.conversation_id)
            .collect()
    }

    pub fn destination(&self, destination_id: RoutingDestinationId) -> Option<&MailRoutingDestination> {
        self.destinations.iter().find(|d| d.id == destination_id)
    }
}

/// `MigrationRepository` backed by plain collections behind a mutex.
///
/// Mirrors the store constraints the pipeline relies on: shortcodes are unique
/// per organization and conversation/space links are deduplicated.
#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_organization(&self, organization_id: OrganizationId, owner_id: Option<MemberId>) {
        self.state().organizations.insert(
            organization_id,
            Organization {
                id: organization_id,
                owner_id,
                migrated: false,
            },
        );
    }

    pub fn add_member(&self, organization_id: OrganizationId, member_id: MemberId, handle: Option<&str>) {
        let mut state = self.state();
        state.members.push((member_id, organization_id));
        state.profiles.insert(
            member_id,
            MemberProfile {
                member_id,
                organization_id,
                handle: handle.map(str::to_string),
                personal_space_id: None,
                default_email_identity_id: None,
            },
        );
    }

    pub fn add_member_without_profile(&self, organization_id: OrganizationId, member_id: MemberId) {
        self.state().members.push((member_id, organization_id));
    }

    pub fn add_team(&self, organization_id: OrganizationId, team_id: TeamId, name: &str) {
        self.state().teams.insert(
            team_id,
            Team {
                id: team_id,
                organization_id,
                name: name.to_string(),
                default_space_id: None,
                default_email_identity_id: None,
            },
        );
    }

    /// Seeds a space that existed before the migration.
    pub fn add_space(&self, organization_id: OrganizationId, shortcode: &str) -> SpaceId {
        let mut state = self.state();
        let space_id = state.next_id();
        state.spaces.push((
            space_id,
            NewSpace {
                organization_id,
                shortcode: shortcode.to_string(),
                name: shortcode.to_string(),
                space_type: org_reshape_shared::types::SpaceType::Open,
                personal_space: false,
                color: "#000000".to_string(),
                icon: "inbox".to_string(),
                created_by: 0,
            },
        ));
        space_id
    }

    /// Creates `count` conversations with `owner` as participant.
    pub fn add_conversations(&self, owner: ParticipantOwner, count: usize) -> Vec<ConversationId> {
        let mut state = self.state();
        (0..count)
            .map(|_| {
                let conversation_id = state.next_id();
                state.participants.push((conversation_id, owner));
                conversation_id
            })
            .collect()
    }

    /// Creates a routing rule with `identities` and one destination pointing
    /// at `owner`.
    pub fn add_destination(
        &self,
        owner: ParticipantOwner,
        identities: &[EmailIdentityId],
    ) -> RoutingDestinationId {
        let mut state = self.state();
        let rule_id = state.next_id();
        let destination_id = state.next_id();
        state.rule_identities.insert(rule_id, identities.to_vec());
        let (member_id, team_id) = match owner {
            ParticipantOwner::Member(id) => (Some(id), None),
            ParticipantOwner::Team(id) => (None, Some(id)),
        };
        state.destinations.push(MailRoutingDestination {
            id: destination_id,
            rule_id,
            member_id,
            team_id,
            space_id: None,
        });
        destination_id
    }

    /// Makes every lookup of this organization fail with a store error.
    pub fn fail_organization(&self, organization_id: OrganizationId) {
        self.state().failing_organizations.insert(organization_id);
    }

    /// Makes `insert_space` fail for spaces with this shortcode.
    pub fn fail_space_insert(&self, shortcode: &str) {
        self.state().failing_shortcodes.insert(shortcode.to_string());
    }

    /// Makes the participant page of `owner` starting at `offset` fail.
    pub fn fail_conversation_page(&self, owner: ParticipantOwner, offset: i64) {
        self.state().failing_pages.insert((owner, offset));
    }

    pub fn is_migrated(&self, organization_id: OrganizationId) -> bool {
        self.state()
            .organizations
            .get(&organization_id)
            .map(|organization| organization.migrated)
            .unwrap_or(false)
    }

    pub fn profile(&self, member_id: MemberId) -> MemberProfile {
        self.state().profiles.get(&member_id).cloned().unwrap()
    }

    pub fn team(&self, team_id: TeamId) -> Team {
        self.state().teams.get(&team_id).cloned().unwrap()
    }

    pub fn space_count(&self) -> usize {
        self.state().spaces.len()
    }
}

fn store_failure() -> RepositoryError {
    RepositoryError::DatabaseError(sqlx::Error::PoolTimedOut)
}

#[async_trait::async_trait]
impl MigrationRepository for InMemoryRepository {
    async fn unmigrated_organizations(&self) -> Result<Vec<Organization>, RepositoryError> {
        Ok(self
            .state()
            .organizations
            .values()
            .filter(|organization| !organization.migrated)
            .cloned()
            .collect())
    }

    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<Organization>, RepositoryError> {
        let state = self.state();
        if state.failing_organizations.contains(&organization_id) {
            return Err(store_failure());
        }
        Ok(state.organizations.get(&organization_id).cloned())
    }

    async fn mark_organization_migrated(
        &self,
        organization_id: OrganizationId,
    ) -> Result<(), RepositoryError> {
        match self.state().organizations.get_mut(&organization_id) {
            Some(organization) => {
                organization.migrated = true;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!(
                "organization {}",
                organization_id
            ))),
        }
    }

    async fn member_ids(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<MemberId>, RepositoryError> {
        let mut ids: Vec<MemberId> = self
            .state()
            .members
            .iter()
            .filter(|(_, org)| *org == organization_id)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn team_ids(&self, organization_id: OrganizationId) -> Result<Vec<TeamId>, RepositoryError> {
        Ok(self
            .state()
            .teams
            .values()
            .filter(|team| team.organization_id == organization_id)
            .map(|team| team.id)
            .collect())
    }

    async fn find_member_profile(
        &self,
        member_id: MemberId,
    ) -> Result<Option<MemberProfile>, RepositoryError> {
        Ok(self.state().profiles.get(&member_id).cloned())
    }

    async fn find_team(&self, team_id: TeamId) -> Result<Option<Team>, RepositoryError> {
        Ok(self.state().teams.get(&team_id).cloned())
    }

    async fn space_shortcodes(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<String>, RepositoryError> {
        Ok(self
            .state()
            .spaces
            .iter()
            .filter(|(_, space)| space.organization_id == organization_id)
            .map(|(_, space)| space.shortcode.clone())
            .collect())
    }

    async fn shortcodes_with_prefix(
        &self,
        organization_id: OrganizationId,
        prefix: &str,
    ) -> Result<Vec<String>, RepositoryError> {
        Ok(self
            .state()
            .spaces
            .iter()
            .filter(|(_, space)| {
                space.organization_id == organization_id && space.shortcode.starts_with(prefix)
            })
            .map(|(_, space)| space.shortcode.clone())
            .collect())
    }

    async fn insert_space(&self, space: &NewSpace) -> Result<SpaceId, RepositoryError> {
        let mut state = self.state();
        if state.failing_shortcodes.contains(&space.shortcode) {
            return Err(store_failure());
        }
        let duplicate = state.spaces.iter().any(|(_, existing)| {
            existing.organization_id == space.organization_id && existing.shortcode == space.shortcode
        });
        if duplicate {
            return Err(store_failure());
        }
        let space_id = state.next_id();
        state.spaces.push((space_id, space.clone()));
        Ok(space_id)
    }

    async fn insert_space_membership(
        &self,
        membership: &NewSpaceMembership,
    ) -> Result<SpaceMembershipId, RepositoryError> {
        let mut state = self.state();
        let membership_id = state.next_id();
        state.memberships.push((membership_id, membership.clone()));
        Ok(membership_id)
    }

    async fn set_member_personal_space(
        &self,
        member_id: MemberId,
        space_id: SpaceId,
    ) -> Result<(), RepositoryError> {
        match self.state().profiles.get_mut(&member_id) {
            Some(profile) => {
                profile.personal_space_id = Some(space_id);
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("member {}", member_id))),
        }
    }

    async fn set_member_default_email_identity(
        &self,
        member_id: MemberId,
        email_identity_id: EmailIdentityId,
    ) -> Result<(), RepositoryError> {
        match self.state().profiles.get_mut(&member_id) {
            Some(profile) => {
                profile.default_email_identity_id = Some(email_identity_id);
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("member {}", member_id))),
        }
    }

    async fn set_team_defaults(
        &self,
        team_id: TeamId,
        space_id: SpaceId,
        email_identity_id: Option<EmailIdentityId>,
    ) -> Result<(), RepositoryError> {
        match self.state().teams.get_mut(&team_id) {
            Some(team) => {
                team.default_space_id = Some(space_id);
                if email_identity_id.is_some() {
                    team.default_email_identity_id = email_identity_id;
                }
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("team {}", team_id))),
        }
    }

    async fn routing_destinations(
        &self,
        owner: ParticipantOwner,
    ) -> Result<Vec<MailRoutingDestination>, RepositoryError> {
        Ok(self
            .state()
            .destinations
            .iter()
            .filter(|destination| match owner {
                ParticipantOwner::Member(id) => destination.member_id == Some(id),
                ParticipantOwner::Team(id) => destination.team_id == Some(id),
            })
            .cloned()
            .collect())
    }

    async fn first_rule_email_identity(
        &self,
        rule_id: RoutingRuleId,
    ) -> Result<Option<EmailIdentityId>, RepositoryError> {
        Ok(self
            .state()
            .rule_identities
            .get(&rule_id)
            .and_then(|identities| identities.first().copied()))
    }

    async fn participant_conversation_ids(
        &self,
        owner: ParticipantOwner,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ConversationId>, RepositoryError> {
        if limit <= 0 || offset < 0 {
            return Err(RepositoryError::InvalidPage { limit, offset });
        }
        let mut state = self.state();
        state.participant_fetches += 1;
        if state.failing_pages.contains(&(owner, offset)) {
            return Err(store_failure());
        }
        Ok(state
            .participants
            .iter()
            .filter(|(_, participant)| *participant == owner)
            .map(|(conversation_id, _)| *conversation_id)
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn insert_conversation_space_links(
        &self,
        links: &[ConversationSpaceLink],
    ) -> Result<(), RepositoryError> {
        let mut state = self.state();
        for link in links {
            let exists = state.links.iter().any(|existing| {
                existing.conversation_id == link.conversation_id && existing.space_id == link.space_id
            });
            if !exists {
                state.links.push(link.clone());
            }
        }
        Ok(())
    }

    async fn repoint_routing_destination(
        &self,
        destination_id: RoutingDestinationId,
        space_id: SpaceId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state();
        match state.destinations.iter_mut().find(|d| d.id == destination_id) {
            Some(destination) => {
                destination.member_id = None;
                destination.team_id = None;
                destination.space_id = Some(space_id);
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!(
                "routing destination {}",
                destination_id
            ))),
        }
    }
}

/// Progress log that keeps every line for assertions.
#[derive(Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<String>>,
}

impl RecordingLog {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl ProgressLog for RecordingLog {
    fn log(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}
