use super::dto::HealthResponse;
use crate::common::response::ApiSuccess;
use crate::config::settings::SERVICE_NAME;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    ApiSuccess(
        HealthResponse {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            mode: state.config.mode.as_str().to_string(),
        },
        StatusCode::OK,
    )
}
