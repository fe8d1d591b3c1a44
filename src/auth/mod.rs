use axum::Router;

use crate::state::AppState;

pub(crate) mod dto;
mod extractors;
mod handlers;
mod jwt;
mod password;
pub(crate) mod repo;

pub(crate) use extractors::AuthUser;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
