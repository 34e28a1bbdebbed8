use crate::error::{AppError, AppResult};

/// Mutations a caller may attempt on someone's post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAction {
    Update,
    Delete,
}

/// Only the owner may mutate a post.
pub fn can_mutate(caller_id: i64, owner_id: i64) -> bool {
    caller_id == owner_id
}

/// Existence must already have been checked; this only decides ownership.
pub fn authorize(caller_id: i64, owner_id: i64, action: PostAction) -> AppResult<()> {
    if can_mutate(caller_id, owner_id) {
        return Ok(());
    }
    let verb = match action {
        PostAction::Update => "update",
        PostAction::Delete => "delete",
    };
    Err(AppError::Forbidden(format!("Not authorized to {verb} this post")))
}
