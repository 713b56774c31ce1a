//! Group and membership repository implementation.
//!
//! Membership mutations are single atomic statements. `remove_member` and
//! `update_member_role` carry a `role <> 'owner'` guard in SQL, so the
//! owner row cannot be touched even by racing requests.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crewchat_core::error::{AppError, ErrorKind};
use crewchat_core::result::AppResult;
use crewchat_core::types::{GroupId, UserId};
use crewchat_entity::group::{CreateGroup, Group, GroupDetail, GroupMember, GroupRole};
use crewchat_entity::store::GroupStore;

/// Repository for groups and their membership rows.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Create a new group repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn members_of(&self, group_id: GroupId) -> AppResult<Vec<GroupMember>> {
        sqlx::query_as::<_, GroupMember>(
            "SELECT * FROM group_members WHERE group_id = $1 ORDER BY added_at ASC",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch members", e))
    }
}

#[async_trait]
impl GroupStore for GroupRepository {
    async fn create_group(&self, cmd: CreateGroup) -> AppResult<GroupDetail> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let group = sqlx::query_as::<_, Group>(
            "INSERT INTO groups (id, name, description, owner_user_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(GroupId::new())
        .bind(&cmd.name)
        .bind(&cmd.description)
        .bind(cmd.owner_user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create group", e))?;

        sqlx::query(
            "INSERT INTO group_members (group_id, user_id, role) VALUES ($1, $2, 'owner')",
        )
        .bind(group.id)
        .bind(cmd.owner_user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add owner", e))?;

        let initial: Vec<Uuid> = cmd
            .initial_member_ids
            .iter()
            .filter(|id| **id != cmd.owner_user_id)
            .map(|id| id.into_uuid())
            .collect();

        if !initial.is_empty() {
            sqlx::query(
                "INSERT INTO group_members (group_id, user_id, role) \
                 SELECT $1, unnest($2::uuid[]), 'member'::group_member_role \
                 ON CONFLICT (group_id, user_id) DO NOTHING",
            )
            .bind(group.id)
            .bind(&initial)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to add initial members", e)
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit group creation", e)
        })?;

        let members = self.members_of(group.id).await?;
        Ok(GroupDetail { group, members })
    }

    async fn find_group(&self, id: GroupId) -> AppResult<Option<GroupDetail>> {
        let group = sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch group", e))?;

        match group {
            Some(group) => {
                let members = self.members_of(group.id).await?;
                Ok(Some(GroupDetail { group, members }))
            }
            None => Ok(None),
        }
    }

    async fn groups_for_user(&self, user_id: UserId) -> AppResult<Vec<Group>> {
        sqlx::query_as::<_, Group>(
            "SELECT g.* FROM groups g \
             JOIN group_members m ON m.group_id = g.id \
             WHERE m.user_id = $1 \
             ORDER BY COALESCE(g.last_message_at, g.created_at) DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list groups", e))
    }

    async fn add_members(&self, group_id: GroupId, member_ids: &[UserId]) -> AppResult<()> {
        let ids: Vec<Uuid> = member_ids.iter().map(|id| id.into_uuid()).collect();

        sqlx::query(
            "INSERT INTO group_members (group_id, user_id, role) \
             SELECT $1, unnest($2::uuid[]), 'member'::group_member_role \
             ON CONFLICT (group_id, user_id) DO NOTHING",
        )
        .bind(group_id)
        .bind(&ids)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add members", e))?;

        Ok(())
    }

    async fn remove_member(&self, group_id: GroupId, member_id: UserId) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM group_members \
             WHERE group_id = $1 AND user_id = $2 AND role <> 'owner'",
        )
        .bind(group_id)
        .bind(member_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to remove member", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_member_role(
        &self,
        group_id: GroupId,
        member_id: UserId,
        role: GroupRole,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE group_members SET role = $3 \
             WHERE group_id = $1 AND user_id = $2 AND role <> 'owner'",
        )
        .bind(group_id)
        .bind(member_id)
        .bind(role)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update role", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_group(&self, group_id: GroupId) -> AppResult<()> {
        // group_members and group_messages cascade.
        sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(group_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete group", e))?;

        Ok(())
    }

    async fn member_ids(&self, group_id: GroupId) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM group_members WHERE group_id = $1",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch member ids", e))
    }

    async fn member_role(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> AppResult<Option<GroupRole>> {
        sqlx::query_scalar::<_, GroupRole>(
            "SELECT role FROM group_members WHERE group_id = $1 AND user_id = $2",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch member role", e))
    }
}
