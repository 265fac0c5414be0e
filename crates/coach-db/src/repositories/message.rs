//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use coach_core::{
    ConversationSummary, Message, MessageRepository, Page, RepoResult, SenderUnread, Snowflake,
};

use crate::models::{ConversationRowModel, MessageModel, SenderUnreadModel};

use super::error::{escape_like_pattern, map_db_error, message_not_found};

const MESSAGE_COLUMNS: &str =
    "id, sender_id, receiver_id, kind, body, attachments, created_at, is_read, read_at";

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn append(&self, message: &Message) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, receiver_id, kind, body, attachments, created_at, is_read, read_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(message.id.into_inner())
        .bind(message.sender_id.into_inner())
        .bind(message.receiver_id.into_inner())
        .bind(message.kind.as_str())
        .bind(&message.body)
        .bind(&message.attachments)
        .bind(message.created_at)
        .bind(message.is_read)
        .bind(message.read_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self))]
    async fn list_conversation(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
        page: Page,
    ) -> RepoResult<Vec<Message>> {
        let results = sqlx::query_as::<_, MessageModel>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(user_a.into_inner())
        .bind(user_b.into_inner())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, sender: Snowflake, receiver: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE, read_at = NOW()
            WHERE sender_id = $1 AND receiver_id = $2 AND is_read = FALSE
            "#,
        )
        .bind(sender.into_inner())
        .bind(receiver.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn unread_count_for(&self, receiver: Snowflake) -> RepoResult<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND is_read = FALSE",
        )
        .bind(receiver.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(count.0)
    }

    #[instrument(skip(self))]
    async fn unread_by_sender(&self, receiver: Snowflake) -> RepoResult<Vec<SenderUnread>> {
        let results = sqlx::query_as::<_, SenderUnreadModel>(
            r#"
            SELECT sender_id, COUNT(*) AS count
            FROM messages
            WHERE receiver_id = $1 AND is_read = FALSE
            GROUP BY sender_id
            ORDER BY count DESC
            "#,
        )
        .bind(receiver.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(SenderUnread::from).collect())
    }

    #[instrument(skip(self, query))]
    async fn search(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
        query: &str,
        page: Page,
    ) -> RepoResult<Vec<Message>> {
        let pattern = format!("%{}%", escape_like_pattern(query));

        let results = sqlx::query_as::<_, MessageModel>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE ((sender_id = $1 AND receiver_id = $2)
                OR (sender_id = $2 AND receiver_id = $1))
              AND body ILIKE $3
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(user_a.into_inner())
        .bind(user_b.into_inner())
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn recent_conversations(
        &self,
        user_id: Snowflake,
        limit: u32,
    ) -> RepoResult<Vec<ConversationSummary>> {
        // Newest message per partner, then order the partners by that
        // message's recency. DISTINCT ON picks the head row of each
        // (partner_id, created_at DESC, id DESC) group.
        let rows = sqlx::query_as::<_, ConversationRowModel>(
            r#"
            SELECT latest.*, u.display_name AS partner_display_name, u.role AS partner_role
            FROM (
                SELECT DISTINCT ON (partner_id)
                    m.id, m.sender_id, m.receiver_id, m.kind, m.body, m.attachments,
                    m.created_at, m.is_read, m.read_at,
                    CASE WHEN m.sender_id = $1 THEN m.receiver_id ELSE m.sender_id END AS partner_id
                FROM messages m
                WHERE m.sender_id = $1 OR m.receiver_id = $1
                ORDER BY partner_id, m.created_at DESC, m.id DESC
            ) latest
            JOIN users u ON u.id = latest.partner_id
            ORDER BY latest.created_at DESC, latest.id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.into_inner())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let unread = self.unread_by_sender(user_id).await?;

        let mut summaries: Vec<ConversationSummary> =
            rows.into_iter().map(ConversationSummary::from).collect();
        for summary in &mut summaries {
            summary.unread_count = unread
                .iter()
                .find(|u| u.sender_id == summary.partner.id)
                .map_or(0, |u| u.count);
        }

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgMessageRepository>();
    }
}
