use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewPost, Post, PostChanges, PostFilter, PostVotesRow, PostWithVotes};
use crate::db::StoreResult;

#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Post>>;
    async fn find_with_votes(&self, id: i64) -> StoreResult<Option<PostWithVotes>>;
    async fn list(&self, filter: &PostFilter) -> StoreResult<Vec<PostWithVotes>>;
    /// Fails with `StoreError::MissingReference` if the owner is gone.
    async fn insert(&self, owner_id: i64, new: &NewPost) -> StoreResult<Post>;
    /// Returns `None` when the post does not exist.
    async fn update(&self, id: i64, changes: &PostChanges)
        -> StoreResult<Option<PostWithVotes>>;
    /// Deleting a post cascades to its votes.
    async fn delete(&self, id: i64) -> StoreResult<bool>;
}

#[derive(Clone)]
pub struct PgPostRepo {
    db: PgPool,
}

impl PgPostRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const WITH_VOTES_COLUMNS: &str = r#"
    p.id, p.title, p.content, p.published, p.owner_id, p.created_at,
    u.email AS owner_email,
    u.password_hash AS owner_password_hash,
    u.created_at AS owner_created_at,
    COUNT(v.post_id) AS votes
"#;

#[async_trait]
impl PostRepo for PgPostRepo {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, published, owner_id, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(post)
    }

    async fn find_with_votes(&self, id: i64) -> StoreResult<Option<PostWithVotes>> {
        let sql = format!(
            r#"
            SELECT {WITH_VOTES_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.owner_id
            LEFT JOIN votes v ON v.post_id = p.id
            WHERE p.id = $1
            GROUP BY p.id, u.id
            "#
        );
        let row = sqlx::query_as::<_, PostVotesRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list(&self, filter: &PostFilter) -> StoreResult<Vec<PostWithVotes>> {
        // strpos keeps the search literal; LIKE would treat % and _ as wildcards.
        let sql = format!(
            r#"
            SELECT {WITH_VOTES_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.owner_id
            LEFT JOIN votes v ON v.post_id = p.id
            WHERE strpos(p.title, $1) > 0
              AND (p.published OR p.owner_id = $2)
            GROUP BY p.id, u.id
            ORDER BY p.id
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, PostVotesRow>(&sql)
            .bind(&filter.title_contains)
            .bind(filter.caller_id)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, owner_id: i64, new: &NewPost) -> StoreResult<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, content, published, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, published, owner_id, created_at
            "#,
        )
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.published)
        .bind(owner_id)
        .fetch_one(&self.db)
        .await?;
        Ok(post)
    }

    async fn update(
        &self,
        id: i64,
        changes: &PostChanges,
    ) -> StoreResult<Option<PostWithVotes>> {
        let sql = format!(
            r#"
            WITH p AS (
                UPDATE posts
                   SET title     = COALESCE($2, title),
                       content   = COALESCE($3, content),
                       published = COALESCE($4, published)
                 WHERE id = $1
                RETURNING id, title, content, published, owner_id, created_at
            )
            SELECT {WITH_VOTES_COLUMNS}
            FROM p
            JOIN users u ON u.id = p.owner_id
            LEFT JOIN votes v ON v.post_id = p.id
            GROUP BY p.id, p.title, p.content, p.published, p.owner_id, p.created_at, u.id
            "#
        );
        let row = sqlx::query_as::<_, PostVotesRow>(&sql)
            .bind(id)
            .bind(changes.title.as_deref())
            .bind(changes.content.as_deref())
            .bind(changes.published)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
