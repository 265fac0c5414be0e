//! PostgreSQL implementation of RelationshipRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use coach_core::{RelationshipRepository, RepoResult, Snowflake};

use super::error::map_db_error;

/// PostgreSQL implementation of RelationshipRepository
#[derive(Clone)]
pub struct PgRelationshipRepository {
    pool: PgPool,
}

impl PgRelationshipRepository {
    /// Create a new PgRelationshipRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationshipRepository for PgRelationshipRepository {
    #[instrument(skip(self))]
    async fn is_linked(&self, user_a: Snowflake, user_b: Snowflake) -> RepoResult<bool> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM coaching_relationships
                WHERE active
                  AND ((trainer_id = $1 AND client_id = $2)
                    OR (trainer_id = $2 AND client_id = $1))
            )
            "#,
        )
        .bind(user_a.into_inner())
        .bind(user_b.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(exists.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgRelationshipRepository>();
    }
}
