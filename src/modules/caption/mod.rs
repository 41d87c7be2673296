use crate::state::AppState;
use axum::Router;
use axum::routing::post;

pub mod download;
pub mod dto;
pub mod error;
pub mod handler;
pub mod model;
pub mod naming;
pub mod service;
pub mod validator;

pub fn router() -> Router<AppState> {
    Router::new().route("/captionize", post(handler::captionize))
}
