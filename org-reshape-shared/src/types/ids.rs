//! Identifier aliases. Every entity in the store is keyed by a `BIGINT`.

pub type OrganizationId = i64;
pub type MemberId = i64;
pub type TeamId = i64;
pub type SpaceId = i64;
pub type SpaceMembershipId = i64;
pub type ConversationId = i64;
pub type RoutingDestinationId = i64;
pub type RoutingRuleId = i64;
pub type EmailIdentityId = i64;
