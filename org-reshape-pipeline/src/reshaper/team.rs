use org_reshape_shared::types::{NewSpace, ParticipantOwner, SpaceType, TeamId};
use tracing::{debug, info, instrument};

use super::{
    DEFAULT_SPACE_COLOR, MissingPrerequisite, OrgContext, ReshapedEntity, Reshaper, StepOutcome,
    TEAM_SPACE_ICON, claim_shortcode,
};
use crate::errors::MigrationError;
use crate::logging::ProgressLog;

impl Reshaper {
    /// Moves one team into a team space administered by the organization owner.
    #[instrument(skip(self, context, log), fields(organization_id = context.organization_id))]
    pub async fn reshape_team(
        &self,
        context: &mut OrgContext,
        team_id: TeamId,
        log: &dyn ProgressLog,
    ) -> Result<StepOutcome, MigrationError> {
        let organization_id = context.organization_id;

        let Some(team) = self.repository.find_team(team_id).await? else {
            return Ok(StepOutcome::MissingPrerequisite(MissingPrerequisite::Team(
                team_id,
            )));
        };
        if let Some(space_id) = team.default_space_id {
            if let Some(missing) = self
                .resume(context, ParticipantOwner::Team(team_id), space_id, log)
                .await?
            {
                return Ok(StepOutcome::MissingPrerequisite(missing));
            }
            log.log(&format!(
                "Organization {}: team {} already has space {}, resumed",
                organization_id, team_id, space_id
            ));
            return Ok(StepOutcome::AlreadyMigrated(space_id));
        }
        let name = team.name.trim();
        if name.is_empty() {
            return Ok(StepOutcome::MissingPrerequisite(
                MissingPrerequisite::TeamName(team_id),
            ));
        }

        let shortcode = claim_shortcode(context, name, log);
        let space = NewSpace {
            organization_id,
            shortcode: shortcode.clone(),
            name: name.to_string(),
            space_type: SpaceType::Private,
            personal_space: false,
            color: DEFAULT_SPACE_COLOR.to_string(),
            icon: TEAM_SPACE_ICON.to_string(),
            created_by: context.owner_id,
        };
        let space_id = self
            .create_space_with_admin(context, space, context.owner_id)
            .await?;
        self.repository
            .set_team_defaults(team_id, space_id, None)
            .await?;
        debug!(team_id, space_id, shortcode = %shortcode, "Created team space");

        let owner = ParticipantOwner::Team(team_id);
        let destinations = self.repository.routing_destinations(owner).await?;
        if let Some(missing) = self.check_destinations(context, owner, &destinations, log) {
            return Ok(StepOutcome::MissingPrerequisite(missing));
        }

        let default_email_identity_id = self.default_identity(&destinations).await?;
        if default_email_identity_id.is_some() {
            self.repository
                .set_team_defaults(team_id, space_id, default_email_identity_id)
                .await?;
        }

        let conversations = self.link_conversations(context, owner, space_id).await?;
        let destinations = self.repoint_destinations(&destinations, space_id).await?;

        info!(team_id, space_id, conversations, destinations, "Team migrated");
        Ok(StepOutcome::Migrated(ReshapedEntity {
            space_id,
            shortcode,
            conversations,
            destinations,
            default_email_identity_id,
        }))
    }
}
