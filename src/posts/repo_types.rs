use sqlx::FromRow;
use time::OffsetDateTime;

use crate::users::repo_types::User;

/// Post record in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub owner_id: i64,
    pub created_at: OffsetDateTime,
}

/// A post joined with its owner and the number of votes it holds.
#[derive(Debug, Clone)]
pub struct PostWithVotes {
    pub post: Post,
    pub owner: User,
    pub votes: i64,
}

/// Fields for a new post; the owner comes from the caller.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub published: bool,
}

/// Partial update: `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

/// Listing parameters.
#[derive(Debug, Clone)]
pub struct PostFilter {
    /// Literal, case-sensitive substring of the title; empty matches all.
    pub title_contains: String,
    pub limit: i64,
    pub offset: i64,
    /// Unpublished posts are only listed for their owner.
    pub caller_id: i64,
}

/// Flat row produced by the post/owner/vote-count join.
#[derive(Debug, FromRow)]
pub(crate) struct PostVotesRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub owner_id: i64,
    pub created_at: OffsetDateTime,
    pub owner_email: String,
    pub owner_password_hash: String,
    pub owner_created_at: OffsetDateTime,
    pub votes: i64,
}

impl From<PostVotesRow> for PostWithVotes {
    fn from(r: PostVotesRow) -> Self {
        Self {
            post: Post {
                id: r.id,
                title: r.title,
                content: r.content,
                published: r.published,
                owner_id: r.owner_id,
                created_at: r.created_at,
            },
            owner: User {
                id: r.owner_id,
                email: r.owner_email,
                password_hash: r.owner_password_hash,
                created_at: r.owner_created_at,
            },
            votes: r.votes,
        }
    }
}
