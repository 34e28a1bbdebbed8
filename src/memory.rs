//! In-memory implementation of every store trait.
//!
//! Used by tests and for running the API without Postgres. All three tables
//! live behind one lock so uniqueness checks and cascades are atomic, the same
//! guarantees the Postgres constraints give.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    db::{StoreError, StoreResult},
    posts::{
        repo::PostRepo,
        repo_types::{NewPost, Post, PostChanges, PostFilter, PostWithVotes},
    },
    users::{repo::UserRepo, repo_types::User},
    votes::repo::VoteRepo,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    votes: BTreeSet<(i64, i64)>, // (user_id, post_id)
    next_user_id: i64,
    next_post_id: i64,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn vote_count(&self, post_id: i64) -> i64 {
        self.votes.iter().filter(|(_, p)| *p == post_id).count() as i64
    }

    fn with_votes(&self, post: &Post) -> Option<PostWithVotes> {
        let owner = self.users.get(&post.owner_id)?.clone();
        Some(PostWithVotes {
            post: post.clone(),
            owner,
            votes: self.vote_count(post.id),
        })
    }

    fn remove_post(&mut self, post_id: i64) -> bool {
        let removed = self.posts.remove(&post_id).is_some();
        self.votes.retain(|(_, p)| *p != post_id);
        removed
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.lock().users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn insert(&self, email: &str, password_hash: &str) -> StoreResult<User> {
        let mut t = self.lock();
        if t.email_taken(email, None) {
            return Err(StoreError::Conflict);
        }
        t.next_user_id += 1;
        let user = User {
            id: t.next_user_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(
        &self,
        id: i64,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<Option<User>> {
        let mut t = self.lock();
        if !t.users.contains_key(&id) {
            return Ok(None);
        }
        if t.email_taken(email, Some(id)) {
            return Err(StoreError::Conflict);
        }
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        user.email = email.to_string();
        user.password_hash = password_hash.to_string();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let mut t = self.lock();
        if t.users.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: Vec<i64> = t
            .posts
            .values()
            .filter(|p| p.owner_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            t.remove_post(post_id);
        }
        t.votes.retain(|(u, _)| *u != id);
        Ok(true)
    }
}

#[async_trait]
impl PostRepo for MemoryStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Post>> {
        Ok(self.lock().posts.get(&id).cloned())
    }

    async fn find_with_votes(&self, id: i64) -> StoreResult<Option<PostWithVotes>> {
        let t = self.lock();
        Ok(t.posts.get(&id).and_then(|p| t.with_votes(p)))
    }

    async fn list(&self, filter: &PostFilter) -> StoreResult<Vec<PostWithVotes>> {
        let t = self.lock();
        let offset = usize::try_from(filter.offset).unwrap_or(0);
        let limit = usize::try_from(filter.limit).unwrap_or(0);
        Ok(t.posts
            .values()
            .filter(|p| p.title.contains(filter.title_contains.as_str()))
            .filter(|p| p.published || p.owner_id == filter.caller_id)
            .skip(offset)
            .take(limit)
            .filter_map(|p| t.with_votes(p))
            .collect())
    }

    async fn insert(&self, owner_id: i64, new: &NewPost) -> StoreResult<Post> {
        let mut t = self.lock();
        if !t.users.contains_key(&owner_id) {
            return Err(StoreError::MissingReference);
        }
        t.next_post_id += 1;
        let post = Post {
            id: t.next_post_id,
            title: new.title.clone(),
            content: new.content.clone(),
            published: new.published,
            owner_id,
            created_at: OffsetDateTime::now_utc(),
        };
        t.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(
        &self,
        id: i64,
        changes: &PostChanges,
    ) -> StoreResult<Option<PostWithVotes>> {
        let mut t = self.lock();
        let Some(post) = t.posts.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = &changes.title {
            post.title = title.clone();
        }
        if let Some(content) = &changes.content {
            post.content = content.clone();
        }
        if let Some(published) = changes.published {
            post.published = published;
        }
        let post = post.clone();
        Ok(t.with_votes(&post))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.lock().remove_post(id))
    }
}

#[async_trait]
impl VoteRepo for MemoryStore {
    async fn exists(&self, user_id: i64, post_id: i64) -> StoreResult<bool> {
        Ok(self.lock().votes.contains(&(user_id, post_id)))
    }

    async fn insert(&self, user_id: i64, post_id: i64) -> StoreResult<()> {
        let mut t = self.lock();
        if !t.users.contains_key(&user_id) || !t.posts.contains_key(&post_id) {
            return Err(StoreError::MissingReference);
        }
        if !t.votes.insert((user_id, post_id)) {
            return Err(StoreError::Conflict);
        }
        Ok(())
    }

    async fn delete(&self, user_id: i64, post_id: i64) -> StoreResult<bool> {
        Ok(self.lock().votes.remove(&(user_id, post_id)))
    }
}
