use axum::Router;

use crate::state::AppState;

pub(crate) mod dto;
mod handlers;
pub(crate) mod repo;

pub fn router() -> Router<AppState> {
    handlers::category_routes()
}
