use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{UserCredentials, UserOut},
    services::validate_credentials,
};
use crate::{
    auth::password::hash_password,
    db::StoreError,
    error::{AppError, AppResult},
    extract::{ValidJson, ValidPath},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/", post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

fn user_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("user with id {id} not found"))
}

fn email_taken(email: &str) -> AppError {
    AppError::Conflict(format!("user with email {email} already exists"))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<UserCredentials>,
) -> AppResult<(StatusCode, Json<UserOut>)> {
    let email = validate_credentials(&payload.email, &payload.password)?;
    let hash = hash_password(&payload.password)?;

    let user = match state.users.insert(&email, &hash).await {
        Ok(u) => u,
        Err(StoreError::Conflict) => {
            warn!(email = %email, "email already registered");
            return Err(email_taken(&email));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<UserOut>> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<UserCredentials>,
) -> AppResult<Json<UserOut>> {
    let email = validate_credentials(&payload.email, &payload.password)?;
    let hash = hash_password(&payload.password)?;

    let user = match state.users.update(id, &email, &hash).await {
        Ok(Some(u)) => u,
        Ok(None) => return Err(user_not_found(id)),
        Err(StoreError::Conflict) => {
            warn!(user_id = id, email = %email, "email already registered");
            return Err(email_taken(&email));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, "user updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<StatusCode> {
    if !state.users.delete(id).await? {
        return Err(user_not_found(id));
    }
    info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
