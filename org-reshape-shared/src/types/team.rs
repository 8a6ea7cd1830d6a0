use serde::{Deserialize, Serialize};
use crate::types::{EmailIdentityId, OrganizationId, SpaceId, TeamId};

/// A team of an organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Team {
    pub id: TeamId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub default_space_id: Option<SpaceId>,
    pub default_email_identity_id: Option<EmailIdentityId>,
}
