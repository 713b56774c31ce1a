//! Message repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use crewchat_core::error::{AppError, ErrorKind};
use crewchat_core::result::AppResult;
use crewchat_core::types::{GroupId, MessageId, UserId};
use crewchat_entity::message::{DirectMessage, GroupMessage, NewDirectMessage, NewGroupMessage};
use crewchat_entity::store::MessageStore;

/// Repository for the append-only direct and group message logs.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn insert_direct(&self, msg: NewDirectMessage) -> AppResult<DirectMessage> {
        // The id is a v7 UUID minted here so canonical ids stay
        // creation-ordered; the timestamp is the database clock.
        sqlx::query_as::<_, DirectMessage>(
            "INSERT INTO direct_messages (id, from_user_id, to_user_id, body, client_message_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING *",
        )
        .bind(MessageId::new())
        .bind(msg.from_user_id)
        .bind(msg.to_user_id)
        .bind(&msg.body)
        .bind(&msg.client_message_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert direct message", e)
        })
    }

    async fn direct_history(&self, a: UserId, b: UserId) -> AppResult<Vec<DirectMessage>> {
        sqlx::query_as::<_, DirectMessage>(
            "SELECT * FROM direct_messages \
             WHERE (from_user_id = $1 AND to_user_id = $2) \
                OR (from_user_id = $2 AND to_user_id = $1) \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to fetch direct history", e)
        })
    }

    async fn insert_group(&self, msg: NewGroupMessage) -> AppResult<GroupMessage> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let persisted = sqlx::query_as::<_, GroupMessage>(
            "INSERT INTO group_messages (id, group_id, from_user_id, body, client_message_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING *",
        )
        .bind(MessageId::new())
        .bind(msg.group_id)
        .bind(msg.from_user_id)
        .bind(&msg.body)
        .bind(&msg.client_message_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert group message", e)
        })?;

        sqlx::query(
            "UPDATE groups SET last_message_body = $2, last_message_at = $3 WHERE id = $1",
        )
        .bind(persisted.group_id)
        .bind(&persisted.body)
        .bind(persisted.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update last-message summary", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit group message", e)
        })?;

        Ok(persisted)
    }

    async fn group_history(&self, group_id: GroupId) -> AppResult<Vec<GroupMessage>> {
        sqlx::query_as::<_, GroupMessage>(
            "SELECT * FROM group_messages WHERE group_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to fetch group history", e)
        })
    }
}
