use crate::common::response::ApiError;
use crate::infrastructure::storage::scratch::StorageError;
use axum::http::StatusCode;
use std::time::Duration;
use thiserror::Error;

use super::dto::{SUBTITLE_FIELD, VIDEO_FIELD};

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upload {
    Video,
    Subtitle,
}

impl Upload {
    pub fn field(&self) -> &'static str {
        match self {
            Upload::Video => VIDEO_FIELD,
            Upload::Subtitle => SUBTITLE_FIELD,
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            Upload::Video => "video",
            Upload::Subtitle => "ASS subtitle",
        }
    }
}

/// Everything that can end a captionize request early.
///
/// Client mistakes map to 4xx, everything on our side of the wire to 5xx.
#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("missing required upload parts")]
    MissingFiles,
    #[error("empty filename for {}", .0.field())]
    NoFileSelected(Upload),
    #[error("subtitle is not an .ass file")]
    InvalidSubtitleFormat,
    #[error("unreadable multipart body: {message}")]
    Multipart { status: StatusCode, message: String },
    #[error("insufficient disk space: {free} bytes free, {required} required")]
    InsufficientStorage { free: u64, required: u64 },
    #[error("ffmpeg exited with {exit_code:?}")]
    TranscodeFailed {
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("ffmpeg timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CaptionError {
    pub fn status(&self) -> StatusCode {
        match self {
            CaptionError::MissingFiles
            | CaptionError::NoFileSelected(_)
            | CaptionError::InvalidSubtitleFormat => StatusCode::BAD_REQUEST,
            CaptionError::Multipart { status, .. } => *status,
            CaptionError::InsufficientStorage { .. } => StatusCode::SERVICE_UNAVAILABLE,
            CaptionError::TranscodeFailed { .. }
            | CaptionError::TimedOut(_)
            | CaptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    pub fn label(&self) -> String {
        match self {
            CaptionError::MissingFiles => "Both video and ASS subtitle files are required".into(),
            CaptionError::NoFileSelected(upload) => format!("No {} file selected", upload.noun()),
            CaptionError::InvalidSubtitleFormat => "Invalid subtitle file format".into(),
            CaptionError::Multipart { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => {
                "Upload too large".into()
            }
            CaptionError::Multipart { .. } => "Invalid multipart request".into(),
            CaptionError::InsufficientStorage { .. } => "Insufficient disk space".into(),
            CaptionError::TranscodeFailed { .. } => "FFmpeg processing failed".into(),
            CaptionError::TimedOut(_) => "FFmpeg processing timed out".into(),
            CaptionError::Internal(_) => "Internal server error".into(),
        }
    }

    pub fn details(&self) -> String {
        match self {
            CaptionError::MissingFiles => format!(
                "Use '{}' for video and '{}' for ASS subtitle file. Note: Only .ass subtitle files are supported.",
                VIDEO_FIELD, SUBTITLE_FIELD
            ),
            CaptionError::NoFileSelected(upload) => {
                format!("The '{}' part was sent with an empty filename.", upload.field())
            }
            CaptionError::InvalidSubtitleFormat => "Only .ass subtitle files are supported. Other formats like .srt, .vtt, etc. are not supported.".into(),
            CaptionError::Multipart { message, .. } => message.clone(),
            CaptionError::InsufficientStorage { free, required } => format!(
                "Only {}MB available, at least {}MB required",
                free / MIB,
                required / MIB
            ),
            CaptionError::TranscodeFailed { stderr, .. } => stderr.clone(),
            CaptionError::TimedOut(limit) => format!(
                "FFmpeg did not finish within the configured timeout of {} seconds",
                limit.as_secs()
            ),
            CaptionError::Internal(e) => format!("{:#}", e),
        }
    }
}

impl From<StorageError> for CaptionError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::InsufficientSpace { free, required } => {
                CaptionError::InsufficientStorage { free, required }
            }
            other => CaptionError::Internal(other.into()),
        }
    }
}

impl From<CaptionError> for ApiError {
    fn from(e: CaptionError) -> Self {
        ApiError::new(e.status(), e.label(), e.details())
    }
}
