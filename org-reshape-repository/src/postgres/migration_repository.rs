//! PostgreSQL implementation of the migration repository.
//!
//! Uses runtime-checked `sqlx` queries against the schema shipped in
//! `src/postgres/migrations`. Every trait method is a single statement executed
//! on the pool; no transactions are opened.
//!
//! ## Database Tables
//!
//! - `organizations`, `members`, `member_profiles`, `teams`: the flat model being reshaped
//! - `spaces`, `space_memberships`: rows created by the migration
//! - `conversation_participants`, `conversation_spaces`: conversation ownership before/after
//! - `mail_routing_destinations`, `mail_routing_rule_identities`: routing rows repointed by the migration
use async_trait::async_trait;
use org_reshape_shared::types::{
    ConversationId, ConversationSpaceLink, EmailIdentityId, MailRoutingDestination, MemberId,
    MemberProfile, NewSpace, NewSpaceMembership, Organization, OrganizationId, ParticipantOwner,
    RoutingDestinationId, RoutingRuleId, SpaceId, SpaceMembershipId, Team, TeamId,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::debug;

use crate::{MigrationRepository, RepositoryError};

/// Column of the participant/destination tables that references `owner`.
fn owner_column(owner: &ParticipantOwner) -> (&'static str, i64) {
    match owner {
        ParticipantOwner::Member(id) => ("member_id", *id),
        ParticipantOwner::Team(id) => ("team_id", *id),
    }
}

fn organization_from_row(row: &PgRow) -> Result<Organization, RepositoryError> {
    Ok(Organization {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        migrated: row.try_get("migrated")?,
    })
}

/// Maps an `UPDATE` that touched no row to `RepositoryError::NotFound`.
fn ensure_updated(rows_affected: u64, what: impl FnOnce() -> String) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        return Err(RepositoryError::NotFound(what()));
    }
    Ok(())
}

fn destination_from_row(row: &PgRow) -> Result<MailRoutingDestination, RepositoryError> {
    Ok(MailRoutingDestination {
        id: row.try_get("id")?,
        rule_id: row.try_get("rule_id")?,
        member_id: row.try_get("member_id")?,
        team_id: row.try_get("team_id")?,
        space_id: row.try_get("space_id")?,
    })
}

/// PostgreSQL-backed migration repository.
pub struct PostgresMigrationRepository {
    pool: sqlx::PgPool,
}

impl PostgresMigrationRepository {
    /// Creates a repository over an existing pool.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with the reshape schema
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `url` and wraps it in a repository.
    ///
    /// # Arguments
    ///
    /// * `url` - PostgreSQL connection string
    /// * `max_connections` - Upper bound of pooled connections
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Applies the bundled schema migrations.
    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("src/postgres/migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MigrationRepository for PostgresMigrationRepository {
    async fn unmigrated_organizations(&self) -> Result<Vec<Organization>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, owner_id, migrated FROM organizations WHERE migrated = FALSE ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(organization_from_row).collect()
    }

    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<Organization>, RepositoryError> {
        let row = sqlx::query("SELECT id, owner_id, migrated FROM organizations WHERE id = $1")
            .bind(organization_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(organization_from_row).transpose()
    }

    async fn mark_organization_migrated(
        &self,
        organization_id: OrganizationId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE organizations SET migrated = TRUE WHERE id = $1")
            .bind(organization_id)
            .execute(&self.pool)
            .await?;

        ensure_updated(result.rows_affected(), || {
            format!("organization {}", organization_id)
        })
    }

    async fn member_ids(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<MemberId>, RepositoryError> {
        let ids: Vec<MemberId> = sqlx::query_scalar("SELECT id FROM members WHERE organization_id = $1 ORDER BY id")
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn team_ids(&self, organization_id: OrganizationId) -> Result<Vec<TeamId>, RepositoryError> {
        let ids: Vec<TeamId> = sqlx::query_scalar("SELECT id FROM teams WHERE organization_id = $1 ORDER BY id")
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn find_member_profile(
        &self,
        member_id: MemberId,
    ) -> Result<Option<MemberProfile>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT m.id, m.organization_id, p.handle, m.personal_space_id, m.default_email_identity_id
            FROM members m
            JOIN member_profiles p ON p.member_id = m.id
            WHERE m.id = $1
            "#,
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(MemberProfile {
            member_id: row.try_get("id")?,
            organization_id: row.try_get("organization_id")?,
            handle: row.try_get("handle")?,
            personal_space_id: row.try_get("personal_space_id")?,
            default_email_identity_id: row.try_get("default_email_identity_id")?,
        }))
    }

    async fn find_team(&self, team_id: TeamId) -> Result<Option<Team>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, organization_id, name, default_space_id, default_email_identity_id FROM teams WHERE id = $1",
        )
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Team {
            id: row.try_get("id")?,
            organization_id: row.try_get("organization_id")?,
            name: row.try_get("name")?,
            default_space_id: row.try_get("default_space_id")?,
            default_email_identity_id: row.try_get("default_email_identity_id")?,
        }))
    }

    async fn space_shortcodes(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<String>, RepositoryError> {
        let shortcodes: Vec<String> = sqlx::query_scalar("SELECT shortcode FROM spaces WHERE organization_id = $1")
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(shortcodes)
    }

    async fn shortcodes_with_prefix(
        &self,
        organization_id: OrganizationId,
        prefix: &str,
    ) -> Result<Vec<String>, RepositoryError> {
        let shortcodes: Vec<String> = sqlx::query_scalar(
            "SELECT shortcode FROM spaces WHERE organization_id = $1 AND left(shortcode, length($2)) = $2",
        )
        .bind(organization_id)
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;
        Ok(shortcodes)
    }

    async fn insert_space(&self, space: &NewSpace) -> Result<SpaceId, RepositoryError> {
        let id: SpaceId = sqlx::query_scalar(
            r#"
            INSERT INTO spaces (organization_id, shortcode, name, space_type, personal_space, color, icon, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(space.organization_id)
        .bind(&space.shortcode)
        .bind(&space.name)
        .bind(space.space_type.as_str())
        .bind(space.personal_space)
        .bind(&space.color)
        .bind(&space.icon)
        .bind(space.created_by)
        .fetch_one(&self.pool)
        .await?;

        debug!(space_id = id, shortcode = %space.shortcode, "Inserted space");
        Ok(id)
    }

    async fn insert_space_membership(
        &self,
        membership: &NewSpaceMembership,
    ) -> Result<SpaceMembershipId, RepositoryError> {
        let permissions = &membership.permissions;
        let id: SpaceMembershipId = sqlx::query_scalar(
            r#"
            INSERT INTO space_memberships (
                organization_id, space_id, member_id, role,
                can_create, can_read, can_comment, can_reply, can_delete, can_change_status,
                can_close, can_tag, can_move, can_add_to_other_space, can_merge, can_add_participants,
                added_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING id
            "#,
        )
        .bind(membership.organization_id)
        .bind(membership.space_id)
        .bind(membership.member_id)
        .bind(membership.role.as_str())
        .bind(permissions.can_create)
        .bind(permissions.can_read)
        .bind(permissions.can_comment)
        .bind(permissions.can_reply)
        .bind(permissions.can_delete)
        .bind(permissions.can_change_status)
        .bind(permissions.can_close)
        .bind(permissions.can_tag)
        .bind(permissions.can_move)
        .bind(permissions.can_add_to_other_space)
        .bind(permissions.can_merge)
        .bind(permissions.can_add_participants)
        .bind(membership.added_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn set_member_personal_space(
        &self,
        member_id: MemberId,
        space_id: SpaceId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE members SET personal_space_id = $2 WHERE id = $1")
            .bind(member_id)
            .bind(space_id)
            .execute(&self.pool)
            .await?;

        ensure_updated(result.rows_affected(), || format!("member {}", member_id))
    }

    async fn set_member_default_email_identity(
        &self,
        member_id: MemberId,
        email_identity_id: EmailIdentityId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE members SET default_email_identity_id = $2 WHERE id = $1")
            .bind(member_id)
            .bind(email_identity_id)
            .execute(&self.pool)
            .await?;

        ensure_updated(result.rows_affected(), || format!("member {}", member_id))
    }

    async fn set_team_defaults(
        &self,
        team_id: TeamId,
        space_id: SpaceId,
        email_identity_id: Option<EmailIdentityId>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE teams
            SET default_space_id = $2,
                default_email_identity_id = COALESCE($3, default_email_identity_id)
            WHERE id = $1
            "#,
        )
        .bind(team_id)
        .bind(space_id)
        .bind(email_identity_id)
        .execute(&self.pool)
        .await?;

        ensure_updated(result.rows_affected(), || format!("team {}", team_id))
    }

    async fn routing_destinations(
        &self,
        owner: ParticipantOwner,
    ) -> Result<Vec<MailRoutingDestination>, RepositoryError> {
        let (column, id) = owner_column(&owner);
        let sql = format!(
            "SELECT id, rule_id, member_id, team_id, space_id FROM mail_routing_destinations WHERE {} = $1 ORDER BY id",
            column
        );
        let rows = sqlx::query(&sql).bind(id).fetch_all(&self.pool).await?;

        rows.iter().map(destination_from_row).collect()
    }

    async fn first_rule_email_identity(
        &self,
        rule_id: RoutingRuleId,
    ) -> Result<Option<EmailIdentityId>, RepositoryError> {
        let identity: Option<EmailIdentityId> = sqlx::query_scalar(
            r#"
            SELECT email_identity_id
            FROM mail_routing_rule_identities
            WHERE rule_id = $1
            ORDER BY position, email_identity_id
            LIMIT 1
            "#,
        )
        .bind(rule_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(identity)
    }

    async fn participant_conversation_ids(
        &self,
        owner: ParticipantOwner,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ConversationId>, RepositoryError> {
        if limit <= 0 || offset < 0 {
            return Err(RepositoryError::InvalidPage { limit, offset });
        }

        let (column, id) = owner_column(&owner);
        let sql = format!(
            "SELECT conversation_id FROM conversation_participants WHERE {} = $1 ORDER BY id LIMIT $2 OFFSET $3",
            column
        );
        let ids: Vec<ConversationId> = sqlx::query_scalar(&sql)
            .bind(id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn insert_conversation_space_links(
        &self,
        links: &[ConversationSpaceLink],
    ) -> Result<(), RepositoryError> {
        if links.is_empty() {
            return Ok(());
        }

        // Bind parameters are capped at 65535 per statement; three per row.
        for chunk in links.chunks(10_000) {
            let mut query_builder = sqlx::QueryBuilder::new(
                "INSERT INTO conversation_spaces (organization_id, conversation_id, space_id) ",
            );
            query_builder.push_values(chunk, |mut b, link| {
                b.push_bind(link.organization_id)
                    .push_bind(link.conversation_id)
                    .push_bind(link.space_id);
            });
            query_builder.push(" ON CONFLICT (conversation_id, space_id) DO NOTHING");
            query_builder.build().execute(&self.pool).await?;
        }

        Ok(())
    }

    async fn repoint_routing_destination(
        &self,
        destination_id: RoutingDestinationId,
        space_id: SpaceId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE mail_routing_destinations SET space_id = $2, member_id = NULL, team_id = NULL WHERE id = $1",
        )
        .bind(destination_id)
        .bind(space_id)
        .execute(&self.pool)
        .await?;

        ensure_updated(result.rows_affected(), || {
            format!("routing destination {}", destination_id)
        })
    }
}
