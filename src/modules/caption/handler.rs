use super::service::CaptionService;
use crate::common::response::{ApiError, ErrorBody};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State, multipart::MultipartRejection},
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use super::error::CaptionError;

/// Burn ASS subtitles into a video
///
/// Responds with the re-encoded video as an attachment named
/// `captioned_<original name>`.
#[utoipa::path(
    post,
    path = "/captionize",
    request_body(content = super::dto::CaptionizeForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Captioned video", content_type = "video/*", body = Vec<u8>),
        (status = 400, description = "Missing, empty or unsupported upload", body = ErrorBody),
        (status = 413, description = "Upload too large", body = ErrorBody),
        (status = 500, description = "FFmpeg failed, timed out, or internal error", body = ErrorBody),
        (status = 503, description = "Not enough free disk space", body = ErrorBody)
    ),
    tag = "Captions"
)]
pub async fn captionize(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    info!("Received captionize request");

    let multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            warn!("Rejected non-multipart request: {}", rejection.body_text());
            return ApiError::from(CaptionError::Multipart {
                status: rejection.status(),
                message: rejection.body_text(),
            })
            .into_response();
        }
    };

    match CaptionService::captionize(&state, multipart).await {
        Ok(video) => video.into_response(),
        Err(e) => {
            if e.is_client_error() {
                warn!("Rejected captionize request: {}", e);
            } else if let CaptionError::Internal(inner) = &e {
                error!("Unexpected error during video processing: {:?}", inner);
            } else {
                error!("Captionize request failed: {}", e);
            }
            ApiError::from(e).into_response()
        }
    }
}
