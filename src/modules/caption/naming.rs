use std::path::Path;
use uuid::Uuid;

pub const SUBTITLE_EXTENSION: &str = ".ass";

/// Temporary file names for one request, namespaced by its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactNames {
    pub video: String,
    pub subtitle: String,
    pub output: String,
}

impl ArtifactNames {
    pub fn derive(id: Uuid, original_video_name: &str) -> Self {
        Self {
            video: video_name(id, original_video_name),
            subtitle: subtitle_name(id),
            output: output_name(id, original_video_name),
        }
    }
}

pub fn video_name(id: Uuid, original_video_name: &str) -> String {
    format!("video_{}{}", id, extension_of(original_video_name))
}

/// The subtitle's own extension is discarded.
pub fn subtitle_name(id: Uuid) -> String {
    format!("sub_{}{}", id, SUBTITLE_EXTENSION)
}

pub fn output_name(id: Uuid, original_video_name: &str) -> String {
    format!("output_{}{}", id, extension_of(original_video_name))
}

/// Last path component of a client-supplied filename. Browsers on Windows
/// sometimes send the full path.
pub fn base_name(file_name: &str) -> &str {
    file_name.rsplit(['/', '\\']).next().unwrap_or(file_name)
}

/// Extension including the leading dot, or an empty string.
pub fn extension_of(file_name: &str) -> String {
    Path::new(base_name(file_name))
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

pub fn has_subtitle_extension(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(SUBTITLE_EXTENSION)
}
