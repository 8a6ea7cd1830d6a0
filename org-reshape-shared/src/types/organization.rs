use serde::{Deserialize, Serialize};
use crate::types::{MemberId, OrganizationId};

/// An organization as seen by the migration.
///
/// `owner_id` is the owner's member id and is used as the acting member for
/// every administrative row the migration creates. `migrated` is the
/// idempotency guard: organizations with the flag set are never selected again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Organization {
    pub id: OrganizationId,
    pub owner_id: Option<MemberId>,
    pub migrated: bool,
}
