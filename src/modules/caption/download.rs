use super::naming::base_name;
use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::error;

use crate::common::response::ApiError;

const FALLBACK_CONTENT_TYPE: &str = "video/mp4";

/// A finished transcode, already detached from the storage area: the file
/// handle stays readable after its path has been removed.
#[derive(Debug)]
pub struct CaptionedVideo {
    pub file: File,
    pub len: u64,
    pub download_name: String,
}

impl CaptionedVideo {
    pub fn new(file: File, len: u64, original_video_name: &str) -> Self {
        Self {
            file,
            len,
            download_name: download_name(original_video_name),
        }
    }
}

impl IntoResponse for CaptionedVideo {
    fn into_response(self) -> Response {
        let content_type = content_type_for(&self.download_name);
        let disposition = content_disposition(&self.download_name);

        let body = Body::from_stream(ReaderStream::new(self.file));

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_LENGTH, self.len)
            .header(header::CONTENT_DISPOSITION, disposition)
            .header(
                header::ACCESS_CONTROL_EXPOSE_HEADERS,
                HeaderValue::from_static("Content-Disposition"),
            )
            .body(body)
            .unwrap_or_else(|e| {
                error!("Failed to build download response: {}", e);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "Failed to build download response",
                )
                .into_response()
            })
    }
}

pub fn download_name(original_video_name: &str) -> String {
    format!("captioned_{}", base_name(original_video_name))
}

pub fn content_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first()
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}

/// `attachment; filename="<name>"` with quotes and backslashes escaped and
/// control characters dropped so the value is always a valid header.
///
/// Non-ASCII names get an ASCII fallback in `filename` plus the exact name
/// as an RFC 6266 `filename*` parameter.
pub fn content_disposition(file_name: &str) -> String {
    let visible: String = file_name.chars().filter(|c| !c.is_control()).collect();

    let mut quoted = String::with_capacity(visible.len());
    for c in visible.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if c.is_ascii() => quoted.push(c),
            _ => quoted.push('_'),
        }
    }

    if visible.is_ascii() {
        format!("attachment; filename=\"{}\"", quoted)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            quoted,
            urlencoding::encode(&visible)
        )
    }
}
