use serde::{Deserialize, Serialize};
use crate::types::{MemberId, OrganizationId, SpaceId};

/// Visibility of a space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpaceType {
    Private,
    Open,
}

impl SpaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpaceType::Private => "private",
            SpaceType::Open => "open",
        }
    }
}

/// Role of a member inside a space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpaceRole {
    Admin,
    Member,
}

impl SpaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpaceRole::Admin => "admin",
            SpaceRole::Member => "member",
        }
    }
}

/// Granular permission flags carried by a space membership.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SpacePermissions {
    pub can_create: bool,
    pub can_read: bool,
    pub can_comment: bool,
    pub can_reply: bool,
    pub can_delete: bool,
    pub can_change_status: bool,
    pub can_close: bool,
    pub can_tag: bool,
    pub can_move: bool,
    pub can_add_to_other_space: bool,
    pub can_merge: bool,
    pub can_add_participants: bool,
}

impl SpacePermissions {
    /// Every flag set; the administrative default used by the migration.
    pub fn all() -> Self {
        Self {
            can_create: true,
            can_read: true,
            can_comment: true,
            can_reply: true,
            can_delete: true,
            can_change_status: true,
            can_close: true,
            can_tag: true,
            can_move: true,
            can_add_to_other_space: true,
            can_merge: true,
            can_add_participants: true,
        }
    }

    pub fn is_all(&self) -> bool {
        *self == Self::all()
    }
}

/// Payload for a space about to be inserted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewSpace {
    pub organization_id: OrganizationId,
    pub shortcode: String,
    pub name: String,
    pub space_type: SpaceType,
    pub personal_space: bool,
    pub color: String,
    pub icon: String,
    pub created_by: MemberId,
}

/// Payload for a space membership about to be inserted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewSpaceMembership {
    pub organization_id: OrganizationId,
    pub space_id: SpaceId,
    pub member_id: MemberId,
    pub role: SpaceRole,
    pub permissions: SpacePermissions,
    pub added_by: MemberId,
}
