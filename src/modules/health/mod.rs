use crate::state::AppState;
use axum::Router;
use axum::routing::get;

pub mod dto;
pub mod handler;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(handler::health_check))
}
