use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::trace::TraceLayer;

pub fn create_app(state: AppState) -> Router {
    // Enforced by the multipart extractor, so oversized uploads surface as
    // `MultipartError`s and get the usual JSON error body.
    let max_upload = state.config.max_upload_bytes;

    crate::routes::configure_routes()
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
