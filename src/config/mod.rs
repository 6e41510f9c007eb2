use crate::core::error::DownloadError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Downloader program name or path.
    pub downloader: String,
    /// Directory the relative defaults hang off. Defaults to the
    /// executable's directory.
    pub base_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub transcoder_dir: Option<PathBuf>,
    pub encoding_var: String,
    pub encoding: String,
    /// Downloader output lines kept for failure reports.
    pub output_tail_lines: usize,
    /// Exit non-zero when the downloader fails.
    pub strict_exit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            downloader: "yt-dlp".to_string(),
            base_dir: None,
            output_dir: None,
            transcoder_dir: None,
            encoding_var: "PYTHONIOENCODING".to_string(),
            encoding: "utf-8".to_string(),
            output_tail_lines: 50,
            strict_exit: true,
        }
    }
}

impl Config {
    /// Reads a TOML file, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|e| DownloadError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml(&text).map_err(|e| DownloadError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn base_dir(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(crate::utils::base_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.base_dir().join("Downloads"))
    }

    pub fn transcoder_dir(&self) -> PathBuf {
        self.transcoder_dir
            .clone()
            .unwrap_or_else(|| self.base_dir().join("ffmpeg").join("bin"))
    }

    /// Environment overrides applied to every downloader run.
    pub fn env_overrides(&self) -> Vec<(String, String)> {
        vec![(self.encoding_var.clone(), self.encoding.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_hang_off_base_dir() {
        let config = Config {
            base_dir: Some(PathBuf::from("/opt/grab")),
            ..Config::default()
        };
        assert_eq!(config.output_dir(), PathBuf::from("/opt/grab/Downloads"));
        assert_eq!(config.transcoder_dir(), PathBuf::from("/opt/grab/ffmpeg/bin"));
        assert_eq!(
            config.env_overrides(),
            vec![("PYTHONIOENCODING".to_string(), "utf-8".to_string())]
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("downloader = \"/usr/local/bin/yt-dlp\"\nstrict_exit = false\n").unwrap();
        assert_eq!(config.downloader, "/usr/local/bin/yt-dlp");
        assert!(!config.strict_exit);
        assert_eq!(config.encoding, "utf-8");
        assert_eq!(config.output_tail_lines, 50);
    }

    #[test]
    fn test_load_without_path_is_default() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.downloader, "yt-dlp");
        assert!(config.strict_exit);
    }

    #[test]
    fn test_load_reports_bad_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("grab.toml");
        std::fs::write(&path, "output_tail_lines = \"many\"").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("grab.toml"));
    }
}
