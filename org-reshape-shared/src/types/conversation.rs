use serde::{Deserialize, Serialize};
use std::fmt;
use crate::types::{ConversationId, MemberId, OrganizationId, SpaceId, TeamId};

/// The owning side of a conversation participant row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ParticipantOwner {
    Member(MemberId),
    Team(TeamId),
}

impl fmt::Display for ParticipantOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantOwner::Member(id) => write!(f, "member {}", id),
            ParticipantOwner::Team(id) => write!(f, "team {}", id),
        }
    }
}

/// One conversation moved into a space.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationSpaceLink {
    pub organization_id: OrganizationId,
    pub conversation_id: ConversationId,
    pub space_id: SpaceId,
}
