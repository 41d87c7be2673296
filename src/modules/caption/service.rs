use super::download::CaptionedVideo;
use super::dto::{CUSTOM_COMMAND_FIELD, ReceivedFile, ReceivedForm, SUBTITLE_FIELD, VIDEO_FIELD};
use super::error::{CaptionError, Upload};
use super::model::RequestContext;
use super::naming::{subtitle_name, video_name};
use super::validator::{validate, worth_storing};
use crate::common::upload::{UploadError, stream_to_file};
use crate::infrastructure::ffmpeg::{self, CaptionCommand};
use crate::state::AppState;
use anyhow::{Context, anyhow};
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use tracing::{error, info};

pub struct CaptionService;

impl CaptionService {
    /// Burns the uploaded subtitle into the uploaded video.
    ///
    /// All temporary files are gone by the time this returns; on success the
    /// result is streamed from an already unlinked file.
    pub async fn captionize(
        state: &AppState,
        multipart: Multipart,
    ) -> Result<CaptionedVideo, CaptionError> {
        state.storage.check_space(state.config.min_free_disk_bytes)?;

        let mut ctx = RequestContext::new(state.storage.clone());
        let result = Self::process(state, &mut ctx, multipart).await;
        ctx.cleanup().await;
        result
    }

    async fn process(
        state: &AppState,
        ctx: &mut RequestContext,
        multipart: Multipart,
    ) -> Result<CaptionedVideo, CaptionError> {
        let form = Self::receive(ctx, multipart).await?;
        let accepted = validate(&form)?;

        info!(
            "Accepted upload: video {:?}, subtitle {:?} (request {})",
            accepted.video_name, accepted.subtitle_name, ctx.id
        );
        let names = ctx.accept(&accepted);

        if let Some(overrides) = ctx.overrides() {
            info!("Applying custom FFmpeg parameters: {}", overrides);
        }

        let invocation = CaptionCommand {
            binary: &state.config.ffmpeg_binary,
            threads: state.config.ffmpeg_threads,
            video: &names.video,
            subtitle: &names.subtitle,
            output: &names.output,
            overrides: ctx.overrides(),
        }
        .build();

        info!("Executing FFmpeg command: {}", invocation);

        let outcome = ffmpeg::run(
            &invocation,
            ctx.storage().root(),
            state.config.ffmpeg_timeout,
        )
        .await
        .with_context(|| format!("failed to start {}", invocation.program()))?;

        if outcome.timed_out {
            let limit = state
                .config
                .ffmpeg_timeout
                .ok_or_else(|| anyhow!("process reported a timeout without a deadline"))?;
            error!("FFmpeg timed out after {}s (request {})", limit.as_secs(), ctx.id);
            return Err(CaptionError::TimedOut(limit));
        }

        if !outcome.success() {
            error!("FFmpeg error: {}", outcome.stderr);
            return Err(CaptionError::TranscodeFailed {
                exit_code: outcome.exit_code,
                stderr: outcome.stderr,
            });
        }

        let output_path = ctx
            .output()
            .ok_or_else(|| anyhow!("no output registered for request {}", ctx.id))?;
        let file = tokio::fs::File::open(output_path)
            .await
            .with_context(|| format!("FFmpeg produced no output at {}", output_path.display()))?;
        let len = file
            .metadata()
            .await
            .context("failed to stat FFmpeg output")?
            .len();

        let original_name = ctx.original_video_name().unwrap_or(accepted.video_name);
        info!("Video processing completed successfully ({} bytes)", len);
        Ok(CaptionedVideo::new(file, len, original_name))
    }

    /// Reads the multipart stream. File parts that could pass validation are
    /// written straight to their artifact paths; the rest are skipped unread.
    async fn receive(
        ctx: &mut RequestContext,
        mut multipart: Multipart,
    ) -> Result<ReceivedForm, CaptionError> {
        let mut form = ReceivedForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or("").to_string();

            let upload = match name.as_str() {
                VIDEO_FIELD => Upload::Video,
                SUBTITLE_FIELD => Upload::Subtitle,
                CUSTOM_COMMAND_FIELD => {
                    let text = field.text().await.map_err(multipart_error)?;
                    if form.custom_command.is_none() {
                        form.custom_command = Some(text);
                    }
                    continue;
                }
                _ => continue,
            };

            // A part without a filename is a plain form field, not a file.
            let Some(file_name) = field.file_name().map(str::to_string) else {
                continue;
            };

            let slot = match upload {
                Upload::Video => &mut form.video,
                Upload::Subtitle => &mut form.subtitle,
            };
            if slot.is_some() {
                continue;
            }
            *slot = Some(ReceivedFile {
                file_name: file_name.clone(),
            });

            if !worth_storing(upload, &file_name) {
                continue;
            }

            let path = match upload {
                Upload::Video => ctx.register_video(&video_name(ctx.id, &file_name)),
                Upload::Subtitle => ctx.register_subtitle(&subtitle_name(ctx.id)),
            };
            info!(
                "Saving temporary file: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            stream_to_file(field, &path).await.map_err(|e| match e {
                UploadError::Stream(e) => multipart_error(e),
                e @ UploadError::Write { .. } => CaptionError::Internal(e.into()),
            })?;
        }

        Ok(form)
    }
}

fn multipart_error(e: MultipartError) -> CaptionError {
    CaptionError::Multipart {
        status: e.status(),
        message: e.body_text(),
    }
}
