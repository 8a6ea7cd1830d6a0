use serde::{Deserialize, Serialize};
use crate::types::{EmailIdentityId, MemberId, OrganizationId, SpaceId};

/// A member row joined with its profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberProfile {
    pub member_id: MemberId,
    pub organization_id: OrganizationId,
    pub handle: Option<String>,
    pub personal_space_id: Option<SpaceId>,
    pub default_email_identity_id: Option<EmailIdentityId>,
}

impl MemberProfile {
    /// Returns the handle if it is present and not blank.
    pub fn usable_handle(&self) -> Option<&str> {
        self.handle
            .as_deref()
            .map(str::trim)
            .filter(|handle| !handle.is_empty())
    }
}
