//! Interactive audio and video flows over injected input and output.

use crate::core::error::{DownloadError, Result};
use crate::core::{CommandExecutor, DownloadOutcome, Downloader, Resolution, AVAILABLE_RESOLUTIONS};
use crate::utils::check_url;
use std::io::{BufRead, Write};
use tracing::warn;

pub const URL_PROMPT: &str = "Input YouTube video URL: ";
pub const INVALID_RESOLUTION_MESSAGE: &str =
    "Invalid input. Please enter a valid resolution (e.g., 720, 480 or 720p60).";
pub const EMPTY_URL_MESSAGE: &str = "Invalid input. Please enter a YouTube video URL.";

/// Prints `message` and reads one trimmed line. End of input reads as "".
pub fn prompt<R, W>(input: &mut R, out: &mut W, message: &str) -> Result<String>
where
    R: BufRead,
    W: Write,
{
    write!(out, "{message}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn answer<R, W>(given: Option<&str>, input: &mut R, out: &mut W, message: &str) -> Result<String>
where
    R: BufRead,
    W: Write,
{
    match given {
        Some(value) => Ok(value.trim().to_string()),
        None => prompt(input, out, message),
    }
}

fn resolution_list() -> String {
    AVAILABLE_RESOLUTIONS
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn reject<W: Write>(out: &mut W, message: &str, reason: String) -> Result<DownloadOutcome> {
    warn!(%reason, "rejected input");
    writeln!(out, "{message}")?;
    Ok(DownloadOutcome::InvalidInput { reason })
}

/// Asks for a URL (unless given) and saves its audio track as MP3.
pub async fn audio_flow<E, R, W>(
    downloader: &Downloader<E>,
    url: Option<&str>,
    input: &mut R,
    out: &mut W,
) -> Result<DownloadOutcome>
where
    E: CommandExecutor,
    R: BufRead,
    W: Write + Send,
{
    let url = answer(url, input, out, URL_PROMPT)?;
    let url = match check_url(&url) {
        Ok(url) => url,
        Err(e @ DownloadError::EmptyUrl) => return reject(out, EMPTY_URL_MESSAGE, e.to_string()),
        Err(e) => return Err(e),
    };

    downloader.download_audio(url, out).await
}

/// Asks for a URL and a resolution (unless given) and saves the video as MP4.
pub async fn video_flow<E, R, W>(
    downloader: &Downloader<E>,
    url: Option<&str>,
    resolution: Option<&str>,
    input: &mut R,
    out: &mut W,
) -> Result<DownloadOutcome>
where
    E: CommandExecutor,
    R: BufRead,
    W: Write + Send,
{
    let url = answer(url, input, out, URL_PROMPT)?;

    let list = resolution_list();
    let resolution = match resolution {
        Some(value) => value.trim().to_string(),
        None => {
            writeln!(out, "Available options: {list}")?;
            prompt(input, out, &format!("Input quality (e.g., {list}): "))?
        }
    };

    let resolution = match Resolution::parse(&resolution) {
        Ok(resolution) => resolution,
        Err(e) => return reject(out, INVALID_RESOLUTION_MESSAGE, e.to_string()),
    };
    let url = match check_url(&url) {
        Ok(url) => url,
        Err(e @ DownloadError::EmptyUrl) => return reject(out, EMPTY_URL_MESSAGE, e.to_string()),
        Err(e) => return Err(e),
    };

    downloader.download_video(url, &resolution, out).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_trims_answer() {
        let mut input = Cursor::new(&b"  https://youtu.be/X \r\nnext\n"[..]);
        let mut out = Vec::new();
        let answer = prompt(&mut input, &mut out, URL_PROMPT).unwrap();
        assert_eq!(answer, "https://youtu.be/X");
        assert_eq!(String::from_utf8(out).unwrap(), URL_PROMPT);
    }

    #[test]
    fn test_prompt_at_end_of_input() {
        let mut input = Cursor::new(&b""[..]);
        let mut out = Vec::new();
        assert_eq!(prompt(&mut input, &mut out, "> ").unwrap(), "");
    }

    #[test]
    fn test_resolution_list() {
        assert_eq!(resolution_list(), "2160, 1440, 1080, 720, 480, 360, 240, 144");
    }
}
