mod conversation;
mod ids;
mod member;
mod organization;
mod routing;
mod space;
mod team;

pub use conversation::{ConversationSpaceLink, ParticipantOwner};
pub use ids::{
    ConversationId, EmailIdentityId, MemberId, OrganizationId, RoutingDestinationId,
    RoutingRuleId, SpaceId, SpaceMembershipId, TeamId,
};
pub use member::MemberProfile;
pub use organization::Organization;
pub use routing::MailRoutingDestination;
pub use space::{NewSpace, NewSpaceMembership, SpacePermissions, SpaceRole, SpaceType};
pub use team::Team;
