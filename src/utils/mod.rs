use crate::core::error::{DownloadError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

/// Directory containing the running executable, falling back to the
/// current directory when it cannot be determined.
pub fn base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Creates `dir` (and parents) if needed. Succeeds if it already exists.
pub fn ensure_output_dir(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| DownloadError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })?;
    debug!(path = %dir.display(), "output directory ready");
    Ok(dir.to_path_buf())
}

/// The bundled transcoder directory, if present on disk.
pub fn transcoder_location(dir: &Path) -> Option<PathBuf> {
    if dir.is_dir() {
        Some(dir.to_path_buf())
    } else {
        warn!(
            path = %dir.display(),
            "bundled ffmpeg not found, the downloader will look for one on PATH"
        );
        None
    }
}

/// Trims the URL and rejects empty input. Anything else is passed through
/// since the downloader also understands bare video IDs.
pub fn check_url(input: &str) -> Result<&str> {
    let url = input.trim();
    if url.is_empty() {
        return Err(DownloadError::EmptyUrl);
    }
    if let Err(e) = Url::parse(url) {
        warn!(url, error = %e, "input is not an absolute URL, passing it through as-is");
    }
    Ok(url)
}
