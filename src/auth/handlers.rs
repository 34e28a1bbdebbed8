use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{LoginForm, TokenResponse},
    jwt::JwtKeys,
    password::verify_password,
};
use crate::{
    error::{AppError, AppResult},
    extract::ValidForm,
    state::AppState,
    users::services::normalize_email,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

fn invalid_credentials() -> AppError {
    AppError::Forbidden("Invalid Credentials".into())
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    ValidForm(form): ValidForm<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let email = normalize_email(&form.username);

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(invalid_credentials());
    };

    if !verify_password(&form.password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(invalid_credentials());
    }

    let access_token = JwtKeys::from_ref(&state).issue(user.id)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse::bearer(access_token)))
}
