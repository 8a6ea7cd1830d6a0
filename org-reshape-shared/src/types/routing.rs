use serde::{Deserialize, Serialize};
use crate::types::{MemberId, RoutingDestinationId, RoutingRuleId, SpaceId, TeamId};

/// A destination entry of a mail-routing rule.
///
/// Before migration a destination points at a member or a team; afterwards it
/// points at a space and the member/team reference is cleared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MailRoutingDestination {
    pub id: RoutingDestinationId,
    pub rule_id: RoutingRuleId,
    pub member_id: Option<MemberId>,
    pub team_id: Option<TeamId>,
    pub space_id: Option<SpaceId>,
}
