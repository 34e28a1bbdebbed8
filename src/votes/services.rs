use tracing::{debug, info, warn};

use super::{dto::VoteDirection, repo::VoteRepo};
use crate::{
    db::StoreError,
    error::{AppError, AppResult},
    posts::repo::PostRepo,
};

/// Result of a successful transition on a (user, post) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Added,
    Removed,
}

impl VoteOutcome {
    pub fn message(self) -> &'static str {
        match self {
            VoteOutcome::Added => "successfully added vote",
            VoteOutcome::Removed => "successfully deleted vote",
        }
    }
}

fn post_missing(post_id: i64) -> AppError {
    AppError::NotFound(format!("post with id {post_id} does not exist"))
}

/// Moves the (user, post) pair between NotVoted and Voted.
///
/// `Add` is strict: a second add for the same pair is a `Conflict`, decided by
/// the store's uniqueness constraint rather than a prior read, so concurrent
/// duplicates resolve to exactly one success. `Remove` is idempotent and
/// succeeds whether or not a vote existed.
pub async fn toggle_vote(
    posts: &dyn PostRepo,
    votes: &dyn VoteRepo,
    user_id: i64,
    post_id: i64,
    dir: VoteDirection,
) -> AppResult<VoteOutcome> {
    if posts.find_by_id(post_id).await?.is_none() {
        return Err(post_missing(post_id));
    }

    match dir {
        VoteDirection::Add => match votes.insert(user_id, post_id).await {
            Ok(()) => {
                info!(user_id, post_id, "vote added");
                Ok(VoteOutcome::Added)
            }
            Err(StoreError::Conflict) => {
                warn!(user_id, post_id, "duplicate vote");
                Err(AppError::Conflict(format!(
                    "user {user_id} has already voted on post {post_id}"
                )))
            }
            // The post was deleted between the existence check and the insert.
            Err(StoreError::MissingReference) => Err(post_missing(post_id)),
            Err(e) => Err(e.into()),
        },
        VoteDirection::Remove => {
            let existed = votes.delete(user_id, post_id).await?;
            debug!(user_id, post_id, existed, "vote removed");
            Ok(VoteOutcome::Removed)
        }
    }
}
