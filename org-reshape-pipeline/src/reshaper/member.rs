use org_reshape_shared::types::{MemberId, NewSpace, ParticipantOwner, SpaceType};
use tracing::{debug, info, instrument};

use super::{
    DEFAULT_SPACE_COLOR, MissingPrerequisite, OrgContext, PERSONAL_SPACE_ICON, ReshapedEntity,
    Reshaper, StepOutcome, claim_shortcode,
};
use crate::errors::MigrationError;
use crate::logging::ProgressLog;

impl Reshaper {
    /// Moves one member into a personal space.
    ///
    /// The space, its admin membership and the member's `personal_space_id`
    /// are written before routing destinations are looked up. Under the halt
    /// policy a member without destinations therefore keeps its new space but
    /// nothing else is migrated for it.
    #[instrument(skip(self, context, log), fields(organization_id = context.organization_id))]
    pub async fn reshape_member(
        &self,
        context: &mut OrgContext,
        member_id: MemberId,
        log: &dyn ProgressLog,
    ) -> Result<StepOutcome, MigrationError> {
        let organization_id = context.organization_id;

        let Some(profile) = self.repository.find_member_profile(member_id).await? else {
            return Ok(StepOutcome::MissingPrerequisite(
                MissingPrerequisite::MemberProfile(member_id),
            ));
        };
        if let Some(space_id) = profile.personal_space_id {
            if let Some(missing) = self
                .resume(context, ParticipantOwner::Member(member_id), space_id, log)
                .await?
            {
                return Ok(StepOutcome::MissingPrerequisite(missing));
            }
            log.log(&format!(
                "Organization {}: member {} already has personal space {}, resumed",
                organization_id, member_id, space_id
            ));
            return Ok(StepOutcome::AlreadyMigrated(space_id));
        }
        let Some(handle) = profile.usable_handle() else {
            return Ok(StepOutcome::MissingPrerequisite(
                MissingPrerequisite::MemberHandle(member_id),
            ));
        };

        let shortcode = claim_shortcode(context, &format!("{}-personal", handle), log);
        let space = NewSpace {
            organization_id,
            shortcode: shortcode.clone(),
            name: format!("{} personal", handle),
            space_type: SpaceType::Private,
            personal_space: true,
            color: DEFAULT_SPACE_COLOR.to_string(),
            icon: PERSONAL_SPACE_ICON.to_string(),
            created_by: context.owner_id,
        };
        let space_id = self.create_space_with_admin(context, space, member_id).await?;
        self.repository
            .set_member_personal_space(member_id, space_id)
            .await?;
        debug!(member_id, space_id, shortcode = %shortcode, "Created personal space");

        let owner = ParticipantOwner::Member(member_id);
        let destinations = self.repository.routing_destinations(owner).await?;
        if let Some(missing) = self.check_destinations(context, owner, &destinations, log) {
            return Ok(StepOutcome::MissingPrerequisite(missing));
        }

        let default_email_identity_id = self.default_identity(&destinations).await?;
        if let Some(identity_id) = default_email_identity_id {
            self.repository
                .set_member_default_email_identity(member_id, identity_id)
                .await?;
        }

        let conversations = self.link_conversations(context, owner, space_id).await?;
        let destinations = self.repoint_destinations(&destinations, space_id).await?;

        info!(
            member_id,
            space_id,
            conversations,
            destinations,
            "Member migrated"
        );
        Ok(StepOutcome::Migrated(ReshapedEntity {
            space_id,
            shortcode,
            conversations,
            destinations,
            default_email_identity_id,
        }))
    }
}
