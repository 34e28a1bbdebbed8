use crate::state::AppState;
use axum::Router;

mod claims;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;

pub use extractors::CurrentUser;
pub use jwt::{JwtKeys, TokenError};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
