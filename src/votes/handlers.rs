use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::instrument;

use super::{
    dto::{VoteRequest, VoteResponse},
    services::toggle_vote,
};
use crate::{
    auth::CurrentUser,
    error::AppResult,
    extract::ValidJson,
    state::AppState,
};

pub fn vote_routes() -> Router<AppState> {
    Router::new()
        .route("/vote", post(vote))
        .route("/vote/", post(vote))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn vote(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(req): ValidJson<VoteRequest>,
) -> AppResult<(StatusCode, Json<VoteResponse>)> {
    let outcome = toggle_vote(
        state.posts.as_ref(),
        state.votes.as_ref(),
        user.id,
        req.post_id,
        req.dir,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(VoteResponse {
            message: outcome.message().into(),
        }),
    ))
}
