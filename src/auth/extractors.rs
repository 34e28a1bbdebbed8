use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::{
    error::{AppError, INVALID_CREDENTIALS, NOT_AUTHENTICATED},
    state::AppState,
    users::repo_types::User,
};

/// The authenticated caller, resolved from the bearer token to a live user record.
///
/// Every protected handler takes this extractor; nothing else decodes tokens.
/// A bad token and a token for a deleted user are rejected identically.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(&parts.headers).ok_or(AppError::Unauthenticated(NOT_AUTHENTICATED))?;

        let user_id = JwtKeys::from_ref(state)
            .verify(token)
            .map_err(|_| AppError::Unauthenticated(INVALID_CREDENTIALS))?;

        let user = state.users.find_by_id(user_id).await?.ok_or_else(|| {
            warn!(user_id, "token refers to a user that no longer exists");
            AppError::Unauthenticated(INVALID_CREDENTIALS)
        })?;

        Ok(CurrentUser(user))
    }
}

/// `Authorization: Bearer <token>`; scheme is case-insensitive.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
