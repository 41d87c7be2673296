use super::dto::AcceptedUpload;
use super::naming::ArtifactNames;
use crate::infrastructure::storage::scratch::StorageArea;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use uuid::Uuid;

/// Per-request state. Every artifact path is registered here before the
/// file is created, so [`RequestContext::cleanup`] (or `Drop`, if the
/// request is abandoned) can remove it.
#[derive(Debug)]
pub struct RequestContext {
    pub id: Uuid,
    storage: StorageArea,
    video: Option<PathBuf>,
    subtitle: Option<PathBuf>,
    output: Option<PathBuf>,
    original_video_name: Option<String>,
    overrides: Option<String>,
}

impl RequestContext {
    pub fn new(storage: StorageArea) -> Self {
        Self {
            id: Uuid::new_v4(),
            storage,
            video: None,
            subtitle: None,
            output: None,
            original_video_name: None,
            overrides: None,
        }
    }

    pub fn storage(&self) -> &StorageArea {
        &self.storage
    }

    /// Records a validated upload and reserves its output path. The input
    /// artifacts were registered while the parts were received.
    pub fn accept(&mut self, upload: &AcceptedUpload<'_>) -> ArtifactNames {
        let names = ArtifactNames::derive(self.id, upload.video_name);
        self.register_output(&names.output);
        self.original_video_name = Some(upload.video_name.to_string());
        self.overrides = upload.overrides.map(str::to_string);
        names
    }

    pub fn original_video_name(&self) -> Option<&str> {
        self.original_video_name.as_deref()
    }

    pub fn overrides(&self) -> Option<&str> {
        self.overrides.as_deref()
    }

    pub fn register_video(&mut self, file_name: &str) -> PathBuf {
        let path = self.storage.path_for(file_name);
        self.video = Some(path.clone());
        path
    }

    pub fn register_subtitle(&mut self, file_name: &str) -> PathBuf {
        let path = self.storage.path_for(file_name);
        self.subtitle = Some(path.clone());
        path
    }

    pub fn register_output(&mut self, file_name: &str) -> PathBuf {
        let path = self.storage.path_for(file_name);
        self.output = Some(path.clone());
        path
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Removes every registered artifact. Each path is taken out of the
    /// context first, so it is attempted at most once.
    pub async fn cleanup(&mut self) {
        for path in self.take_artifacts() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!("Cleaned up temp file: {}", path.display()),
                Err(e) => log_removal_error(&path, &e),
            }
        }
    }

    fn take_artifacts(&mut self) -> Vec<PathBuf> {
        [self.video.take(), self.subtitle.take(), self.output.take()]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl Drop for RequestContext {
    fn drop(&mut self) {
        for path in self.take_artifacts() {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!("Cleaned up abandoned temp file: {}", path.display()),
                Err(e) => log_removal_error(&path, &e),
            }
        }
    }
}

fn log_removal_error(path: &Path, e: &std::io::Error) {
    // Registered but never created, e.g. ffmpeg failed before writing output.
    if e.kind() == ErrorKind::NotFound {
        return;
    }
    error!("Error cleaning up {}: {}", path.display(), e);
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage() -> (tempfile::TempDir, StorageArea) {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageArea::init(dir.path()).await.unwrap();
        (dir, storage)
    }

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn cleanup_removes_every_artifact() {
        let (dir, storage) = storage().await;
        let mut ctx = RequestContext::new(storage);

        for path in [
            ctx.register_video("video_a.mp4"),
            ctx.register_subtitle("sub_a.ass"),
            ctx.register_output("output_a.mp4"),
        ] {
            std::fs::write(path, b"x").unwrap();
        }
        assert_eq!(entries(dir.path()), 3);

        ctx.cleanup().await;

        assert_eq!(entries(dir.path()), 0);
        assert!(ctx.output().is_none());
    }

    #[tokio::test]
    async fn cleanup_tolerates_missing_files() {
        let (dir, storage) = storage().await;
        let mut ctx = RequestContext::new(storage);

        let video = ctx.register_video("video_b.mp4");
        std::fs::write(&video, b"x").unwrap();
        ctx.register_output("output_b.mp4");

        ctx.cleanup().await;

        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn one_failed_removal_does_not_stop_the_rest() {
        let (dir, storage) = storage().await;
        let mut ctx = RequestContext::new(storage);

        // A directory cannot be removed with remove_file.
        let video = ctx.register_video("video_c");
        std::fs::create_dir(&video).unwrap();
        let subtitle = ctx.register_subtitle("sub_c.ass");
        std::fs::write(&subtitle, b"x").unwrap();

        ctx.cleanup().await;

        assert!(video.exists());
        assert!(!subtitle.exists());
        assert_eq!(entries(dir.path()), 1);
    }

    #[tokio::test]
    async fn dropped_context_removes_artifacts() {
        let (dir, storage) = storage().await;
        {
            let mut ctx = RequestContext::new(storage);
            let subtitle = ctx.register_subtitle("sub_d.ass");
            std::fs::write(subtitle, b"x").unwrap();
        }
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn accept_records_upload_and_reserves_output() {
        let (dir, storage) = storage().await;
        let mut ctx = RequestContext::new(storage);
        assert!(ctx.output().is_none());

        let names = ctx.accept(&AcceptedUpload {
            video_name: "clip.mov",
            subtitle_name: "subs.ass",
            overrides: Some("-vf scale=640:-1"),
        });

        assert_eq!(names, ArtifactNames::derive(ctx.id, "clip.mov"));
        assert_eq!(ctx.output(), Some(dir.path().join(&names.output).as_path()));
        assert_eq!(ctx.original_video_name(), Some("clip.mov"));
        assert_eq!(ctx.overrides(), Some("-vf scale=640:-1"));

        std::fs::write(dir.path().join(&names.output), b"x").unwrap();
        ctx.cleanup().await;
        assert_eq!(entries(dir.path()), 0);
        assert_eq!(ctx.original_video_name(), Some("clip.mov"));
    }

    #[tokio::test]
    async fn contexts_get_distinct_ids() {
        let (_dir, storage) = storage().await;
        let a = RequestContext::new(storage.clone());
        let b = RequestContext::new(storage);
        assert_ne!(a.id, b.id);
    }
}
