use std::fmt;

/// A fully built external command: program first, output path last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    tokens: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            tokens: vec![program.into()],
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.tokens.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    pub fn arguments(&self) -> &[String] {
        &self.tokens[1..]
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

/// Burns an ASS subtitle track into a video with libx264.
///
/// File names are passed as given; the runner resolves them against the
/// storage area by setting the child's working directory.
#[derive(Debug, Clone)]
pub struct CaptionCommand<'a> {
    pub binary: &'a str,
    pub threads: u32,
    pub video: &'a str,
    pub subtitle: &'a str,
    pub output: &'a str,
    pub overrides: Option<&'a str>,
}

impl CaptionCommand<'_> {
    pub fn build(&self) -> Invocation {
        Invocation::new(self.binary)
            .args(["-threads".to_string(), self.threads.to_string()])
            .args(["-i", self.video])
            .arg("-vf")
            .arg(format!("ass={}", self.subtitle))
            .args(["-c:v", "libx264", "-preset", "fast", "-crf", "22"])
            .args(["-c:a", "copy"])
            .args(split_overrides(self.overrides.unwrap_or_default()))
            .arg(self.output)
    }
}

/// Splits caller-supplied extra arguments on whitespace. No quoting is honoured.
pub fn split_overrides(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(overrides: Option<&str>) -> Invocation {
        CaptionCommand {
            binary: "ffmpeg",
            threads: 0,
            video: "video_1.mp4",
            subtitle: "sub_1.ass",
            output: "output_1.mp4",
            overrides,
        }
        .build()
    }

    #[test]
    fn baseline_command() {
        let invocation = command(None);

        assert_eq!(
            invocation.tokens(),
            [
                "ffmpeg", "-threads", "0", "-i", "video_1.mp4", "-vf", "ass=sub_1.ass", "-c:v",
                "libx264", "-preset", "fast", "-crf", "22", "-c:a", "copy", "output_1.mp4",
            ]
        );
        assert_eq!(invocation.program(), "ffmpeg");
        assert_eq!(invocation.arguments()[0], "-threads");
    }

    #[test]
    fn overrides_are_spliced_before_output() {
        let invocation = command(Some("-vf scale=640:-1"));
        let tokens = invocation.tokens();
        let n = tokens.len();

        assert_eq!(tokens[n - 1], "output_1.mp4");
        assert_eq!(tokens[n - 3], "-vf");
        assert_eq!(tokens[n - 2], "scale=640:-1");
        assert_eq!(n, command(None).tokens().len() + 2);
    }

    #[test]
    fn overrides_keep_every_baseline_flag() {
        let baseline = command(None);
        let overridden = command(Some("  -t 5\t-an \n"));
        let tokens = overridden.tokens();

        assert_eq!(&tokens[..baseline.tokens().len() - 1], &baseline.tokens()[..baseline.tokens().len() - 1]);
        assert_eq!(&tokens[tokens.len() - 4..], ["-t", "5", "-an", "output_1.mp4"]);
    }

    #[test]
    fn whitespace_only_override_is_no_override() {
        assert_eq!(command(Some(" \t\n ")), command(None));
        assert_eq!(command(Some("")), command(None));
    }

    #[test]
    fn display_joins_tokens() {
        let invocation = Invocation::new("ffmpeg").args(["-i", "a.mp4"]).arg("b.mp4");
        assert_eq!(invocation.to_string(), "ffmpeg -i a.mp4 b.mp4");
    }
}
