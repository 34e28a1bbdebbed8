use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::{NewPost, Post, PostChanges, PostWithVotes};
use crate::users::{dto::UserOut, repo_types::User};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default = "default_published")]
    pub published: bool,
}
fn default_published() -> bool {
    true
}

impl From<CreatePostRequest> for NewPost {
    fn from(r: CreatePostRequest) -> Self {
        Self {
            title: r.title,
            content: r.content,
            published: r.published,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

impl From<UpdatePostRequest> for PostChanges {
    fn from(r: UpdatePostRequest) -> Self {
        Self {
            title: r.title,
            content: r.content,
            published: r.published,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSchema {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub owner_id: i64,
    pub owner: UserOut,
}

/// `{"Post": {...}, "votes": n}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostOut {
    #[serde(rename = "Post")]
    pub post: PostSchema,
    pub votes: i64,
}

impl PostOut {
    pub fn new(post: Post, owner: User, votes: i64) -> Self {
        Self {
            post: PostSchema {
                id: post.id,
                title: post.title,
                content: post.content,
                published: post.published,
                created_at: post.created_at,
                owner_id: post.owner_id,
                owner: owner.into(),
            },
            votes,
        }
    }
}

impl From<PostWithVotes> for PostOut {
    fn from(p: PostWithVotes) -> Self {
        Self::new(p.post, p.owner, p.votes)
    }
}

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub skip: i64,
    #[serde(default)]
    pub search: String,
}
fn default_limit() -> i64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_defaults_to_true() {
        let req: CreatePostRequest =
            serde_json::from_str(r#"{"title":"t","content":"c"}"#).unwrap();
        assert!(req.published);
    }

    #[test]
    fn post_out_uses_capitalised_key_and_hides_hash() {
        let now = OffsetDateTime::now_utc();
        let out = PostOut::new(
            Post {
                id: 1,
                title: "t".into(),
                content: "c".into(),
                published: true,
                owner_id: 9,
                created_at: now,
            },
            User {
                id: 9,
                email: "a@b.co".into(),
                password_hash: "$argon2id$secret".into(),
                created_at: now,
            },
            0,
        );
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["Post"]["owner"]["email"], "a@b.co");
        assert_eq!(json["votes"], 0);
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn list_query_defaults() {
        let q: ListPostsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!((q.limit, q.skip, q.search.as_str()), (10, 0, ""));
    }
}
