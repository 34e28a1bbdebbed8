use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::StoreResult;

/// The (user, post) vote relation. At most one row per pair, enforced by the store.
#[async_trait]
pub trait VoteRepo: Send + Sync {
    async fn exists(&self, user_id: i64, post_id: i64) -> StoreResult<bool>;
    /// Fails with `StoreError::Conflict` if the pair already exists and with
    /// `StoreError::MissingReference` if the user or post is gone.
    async fn insert(&self, user_id: i64, post_id: i64) -> StoreResult<()>;
    /// Returns whether a row was removed; absent rows are not an error.
    async fn delete(&self, user_id: i64, post_id: i64) -> StoreResult<bool>;
}

#[derive(Clone)]
pub struct PgVoteRepo {
    db: PgPool,
}

impl PgVoteRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VoteRepo for PgVoteRepo {
    async fn exists(&self, user_id: i64, post_id: i64) -> StoreResult<bool> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM votes WHERE user_id = $1 AND post_id = $2)",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(&self.db)
        .await?;
        Ok(found)
    }

    async fn insert(&self, user_id: i64, post_id: i64) -> StoreResult<()> {
        // No pre-check: the primary key decides between concurrent duplicates.
        sqlx::query("INSERT INTO votes (user_id, post_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn delete(&self, user_id: i64, post_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM votes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
