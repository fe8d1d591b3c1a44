use axum::Router;

use crate::state::AppState;

mod dto;
mod handlers;
mod repo;

pub fn router() -> Router<AppState> {
    handlers::transaction_routes()
}
