use crate::core::resolution::Resolution;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Everything a downloader invocation needs besides the request itself.
#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub program: String,
    pub output_dir: PathBuf,
    /// Directory holding the bundled transcoder, if one was found.
    pub transcoder: Option<PathBuf>,
    /// Variables set on top of the inherited environment.
    pub env: Vec<(String, String)>,
}

/// Ordered argument list for one downloader run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Value following `flag`, if the flag is present.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// Shell-like rendering used in diagnostics.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_alphanumeric() || "-_./:=,@%+".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// `%` in the directory is literal, so it is doubled before the
/// template fields are appended.
fn output_template(dir: &Path, file_pattern: &str) -> String {
    let dir = dir.to_string_lossy().replace('%', "%%");
    Path::new(&dir).join(file_pattern).to_string_lossy().into_owned()
}

fn finish(settings: &ToolSettings, mut spec: CommandSpec, url: &str) -> CommandSpec {
    if let Some(transcoder) = &settings.transcoder {
        spec = spec
            .arg("--ffmpeg-location")
            .arg(transcoder.to_string_lossy().into_owned());
    }
    for (key, value) in &settings.env {
        spec = spec.env(key.clone(), value.clone());
    }
    // Everything after `--` is positional, even input starting with `-`.
    spec.arg("--").arg(url)
}

/// Best audio, re-encoded to MP3 at the highest quality setting.
pub fn audio_command(settings: &ToolSettings, url: &str) -> CommandSpec {
    let spec = CommandSpec::new(settings.program.clone())
        .arg("-o")
        .arg(output_template(&settings.output_dir, "%(title)s.%(ext)s"))
        .args(["--extract-audio", "--audio-format", "mp3", "--audio-quality", "0"]);
    finish(settings, spec, url)
}

/// Best video at or below the requested height merged with best audio,
/// falling back to the best combined stream, muxed into MP4.
pub fn video_command(settings: &ToolSettings, url: &str, resolution: &Resolution) -> CommandSpec {
    let constraint = resolution.constraint();
    let pattern = format!("%(title)s_{}.%(ext)s", resolution.file_label());

    let spec = CommandSpec::new(settings.program.clone())
        .arg("-o")
        .arg(output_template(&settings.output_dir, &pattern))
        .arg("--format")
        .arg(format!("bestvideo{constraint}+bestaudio/best{constraint}"))
        .args(["--merge-output-format", "mp4"]);
    finish(settings, spec, url)
}
