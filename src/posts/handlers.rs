use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreatePostRequest, ListPostsQuery, PostOut, UpdatePostRequest},
    policy::{authorize, PostAction},
    repo_types::{NewPost, PostChanges, PostFilter},
};
use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    extract::{ValidJson, ValidPath, ValidQuery},
    state::AppState,
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
}

fn post_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Post {id} not found"))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(payload): ValidJson<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<PostOut>)> {
    let post = state.posts.insert(user.id, &NewPost::from(payload)).await?;
    info!(post_id = post.id, "post created");
    Ok((StatusCode::CREATED, Json(PostOut::new(post, user, 0))))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_posts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<ListPostsQuery>,
) -> AppResult<Json<Vec<PostOut>>> {
    if q.limit < 1 {
        return Err(AppError::Validation("limit must be at least 1".into()));
    }
    if q.skip < 0 {
        return Err(AppError::Validation("skip must not be negative".into()));
    }

    let filter = PostFilter {
        title_contains: q.search,
        limit: q.limit,
        offset: q.skip,
        caller_id: user.id,
    };
    let posts = state.posts.list(&filter).await?;
    Ok(Json(posts.into_iter().map(PostOut::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<PostOut>> {
    let post = state
        .posts
        .find_with_votes(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;
    Ok(Json(post.into()))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<UpdatePostRequest>,
) -> AppResult<Json<PostOut>> {
    // Existence first: a missing post is 404 for everyone.
    let existing = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;
    authorize(user.id, existing.owner_id, PostAction::Update)?;

    // owner_id never changes, so the check above still holds; only a
    // concurrent delete can make the row disappear.
    let updated = state
        .posts
        .update(id, &PostChanges::from(payload))
        .await?
        .ok_or_else(|| post_not_found(id))?;

    info!(post_id = id, "post updated");
    Ok(Json(updated.into()))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<StatusCode> {
    let existing = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;
    authorize(user.id, existing.owner_id, PostAction::Delete)?;

    if !state.posts.delete(id).await? {
        return Err(post_not_found(id));
    }

    info!(post_id = id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}
