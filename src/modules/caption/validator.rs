use super::dto::{AcceptedUpload, ReceivedForm};
use super::error::{CaptionError, Upload};
use super::naming::has_subtitle_extension;

/// Accepts or rejects an upload. Rules apply in order: presence, then
/// non-empty filenames, then the subtitle extension.
pub fn validate(form: &ReceivedForm) -> Result<AcceptedUpload<'_>, CaptionError> {
    let (Some(video), Some(subtitle)) = (&form.video, &form.subtitle) else {
        return Err(CaptionError::MissingFiles);
    };

    if video.file_name.is_empty() {
        return Err(CaptionError::NoFileSelected(Upload::Video));
    }
    if subtitle.file_name.is_empty() {
        return Err(CaptionError::NoFileSelected(Upload::Subtitle));
    }

    if !has_subtitle_extension(&subtitle.file_name) {
        return Err(CaptionError::InvalidSubtitleFormat);
    }

    Ok(AcceptedUpload {
        video_name: &video.file_name,
        subtitle_name: &subtitle.file_name,
        overrides: form
            .custom_command
            .as_deref()
            .filter(|raw| !raw.trim().is_empty()),
    })
}

/// Whether a part is worth writing to disk while the form is still being
/// read. Parts failing this are rejected by [`validate`] regardless of what
/// else arrives.
pub fn worth_storing(upload: Upload, file_name: &str) -> bool {
    match upload {
        Upload::Video => !file_name.is_empty(),
        Upload::Subtitle => !file_name.is_empty() && has_subtitle_extension(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::caption::dto::ReceivedFile;

    fn file(name: &str) -> Option<ReceivedFile> {
        Some(ReceivedFile {
            file_name: name.to_string(),
        })
    }

    fn form(video: Option<ReceivedFile>, subtitle: Option<ReceivedFile>) -> ReceivedForm {
        ReceivedForm {
            video,
            subtitle,
            custom_command: None,
        }
    }

    #[test]
    fn accepts_video_and_ass() {
        let form = form(file("clip.mp4"), file("subs.ass"));
        let accepted = validate(&form).unwrap();

        assert_eq!(accepted.video_name, "clip.mp4");
        assert_eq!(accepted.subtitle_name, "subs.ass");
        assert_eq!(accepted.overrides, None);
    }

    #[test]
    fn missing_parts_win_over_other_problems() {
        for form in [
            form(None, file("subs.ass")),
            form(file("clip.mp4"), None),
            form(None, None),
            form(None, file("subs.srt")),
            form(file(""), None),
        ] {
            assert!(matches!(validate(&form), Err(CaptionError::MissingFiles)));
        }
    }

    #[test]
    fn empty_filenames_name_the_side() {
        assert!(matches!(
            validate(&form(file(""), file("subs.ass"))),
            Err(CaptionError::NoFileSelected(Upload::Video))
        ));
        assert!(matches!(
            validate(&form(file("clip.mp4"), file(""))),
            Err(CaptionError::NoFileSelected(Upload::Subtitle))
        ));
        assert!(matches!(
            validate(&form(file(""), file(""))),
            Err(CaptionError::NoFileSelected(Upload::Video))
        ));
    }

    #[test]
    fn rejects_non_ass_subtitles() {
        for name in ["subs.srt", "subs.vtt", "subs.ass.bak", "subs"] {
            assert!(matches!(
                validate(&form(file("clip.mov"), file(name))),
                Err(CaptionError::InvalidSubtitleFormat)
            ));
        }
        assert!(validate(&form(file("clip.mov"), file("SUBS.ASS"))).is_ok());
    }

    #[test]
    fn blank_custom_command_is_dropped() {
        let mut received = form(file("clip.mp4"), file("subs.ass"));
        received.custom_command = Some("   ".into());
        assert_eq!(validate(&received).unwrap().overrides, None);

        received.custom_command = Some("-vf scale=640:-1".into());
        assert_eq!(
            validate(&received).unwrap().overrides,
            Some("-vf scale=640:-1")
        );
    }

    #[test]
    fn storing_filter_matches_validation() {
        assert!(worth_storing(Upload::Video, "clip.mp4"));
        assert!(!worth_storing(Upload::Video, ""));
        assert!(worth_storing(Upload::Subtitle, "subs.ASS"));
        assert!(!worth_storing(Upload::Subtitle, "subs.srt"));
    }
}
