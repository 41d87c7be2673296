use utoipa::ToSchema;

pub const VIDEO_FIELD: &str = "input_video_file";
pub const SUBTITLE_FIELD: &str = "input_ass_file";
pub const CUSTOM_COMMAND_FIELD: &str = "custom_command";

/// Multipart body of `POST /captionize`. Only used for the OpenAPI document;
/// the handler reads the parts as a stream.
#[derive(ToSchema)]
pub struct CaptionizeForm {
    /// Video to burn subtitles into.
    #[schema(value_type = String, format = Binary)]
    pub input_video_file: Vec<u8>,
    /// Subtitle track. Must be an `.ass` file.
    #[schema(value_type = String, format = Binary)]
    pub input_ass_file: Vec<u8>,
    /// Extra ffmpeg arguments, whitespace separated, placed before the output file.
    #[schema(example = "-vf scale=640:-1")]
    pub custom_command: Option<String>,
}

/// A file part as announced by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFile {
    pub file_name: String,
}

/// What the multipart stream contained, before validation.
#[derive(Debug, Clone, Default)]
pub struct ReceivedForm {
    pub video: Option<ReceivedFile>,
    pub subtitle: Option<ReceivedFile>,
    pub custom_command: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedUpload<'a> {
    pub video_name: &'a str,
    pub subtitle_name: &'a str,
    pub overrides: Option<&'a str>,
}
