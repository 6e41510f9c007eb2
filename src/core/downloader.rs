use crate::core::command::{audio_command, video_command, CommandSpec, ToolSettings};
use crate::core::error::Result;
use crate::core::executor::{CommandExecutor, OutputLine};
use crate::core::resolution::Resolution;
use std::collections::VecDeque;
use std::io::Write;
use tracing::{info, warn};

/// Result of one requested download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed,
    ToolFailed {
        code: Option<i32>,
        command: String,
        /// Last lines the downloader printed before exiting.
        output_tail: Vec<String>,
    },
    InvalidInput {
        reason: String,
    },
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Completed)
    }

    /// Process exit status for this outcome. With `strict` off a failed
    /// download still exits 0.
    pub fn exit_code(&self, strict: bool) -> u8 {
        match self {
            DownloadOutcome::Completed => 0,
            DownloadOutcome::ToolFailed { .. } if strict => 1,
            DownloadOutcome::ToolFailed { .. } => 0,
            DownloadOutcome::InvalidInput { .. } => 2,
        }
    }
}

pub struct Downloader<E> {
    executor: E,
    settings: ToolSettings,
    tail_lines: usize,
}

impl<E: CommandExecutor> Downloader<E> {
    pub fn new(executor: E, settings: ToolSettings, tail_lines: usize) -> Self {
        Self {
            executor,
            settings,
            tail_lines,
        }
    }

    pub async fn download_audio<W>(&self, url: &str, out: &mut W) -> Result<DownloadOutcome>
    where
        W: Write + Send,
    {
        info!(url, "downloading audio");
        self.execute(audio_command(&self.settings, url), out).await
    }

    pub async fn download_video<W>(
        &self,
        url: &str,
        resolution: &Resolution,
        out: &mut W,
    ) -> Result<DownloadOutcome>
    where
        W: Write + Send,
    {
        info!(url, resolution = resolution.raw(), "downloading video");
        self.execute(video_command(&self.settings, url, resolution), out)
            .await
    }

    async fn execute<W>(&self, command: CommandSpec, out: &mut W) -> Result<DownloadOutcome>
    where
        W: Write + Send,
    {
        info!(command = %command.display(), "running downloader");

        let limit = self.tail_lines;
        let mut tail: VecDeque<String> = VecDeque::with_capacity(limit);
        let mut write_error = None;

        let report = {
            let mut relay = |line: OutputLine| {
                if write_error.is_none() {
                    if let Err(e) = writeln!(out, "{}", line.text).and_then(|_| out.flush()) {
                        write_error = Some(e);
                    }
                }
                if limit > 0 {
                    if tail.len() == limit {
                        tail.pop_front();
                    }
                    tail.push_back(line.text);
                }
            };
            self.executor.run(&command, &mut relay).await?
        };

        if let Some(e) = write_error {
            return Err(e.into());
        }

        if report.success() {
            info!("downloader finished");
            return Ok(DownloadOutcome::Completed);
        }

        let command_text = command.display();
        let code_text = report
            .code
            .map_or_else(|| "unknown".to_string(), |c| c.to_string());
        warn!(code = ?report.code, "downloader failed");
        writeln!(
            out,
            "An error occurred: Command '{}' returned non-zero exit status {}.",
            command_text, code_text
        )?;

        Ok(DownloadOutcome::ToolFailed {
            code: report.code,
            command: command_text,
            output_tail: tail.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let failed = DownloadOutcome::ToolFailed {
            code: Some(1),
            command: "yt-dlp X".to_string(),
            output_tail: vec![],
        };
        assert_eq!(DownloadOutcome::Completed.exit_code(true), 0);
        assert_eq!(failed.exit_code(true), 1);
        assert_eq!(failed.exit_code(false), 0);
        assert_eq!(
            DownloadOutcome::InvalidInput {
                reason: "bad".to_string()
            }
            .exit_code(false),
            2
        );
        assert!(!failed.is_success());
    }

    #[test]
    fn test_dry_run_relays_descriptor() {
        let settings = ToolSettings {
            program: "yt-dlp".to_string(),
            output_dir: std::path::PathBuf::from("Downloads"),
            transcoder: None,
            env: vec![],
        };
        let downloader = Downloader::new(crate::core::DryRunExecutor, settings, 10);
        let mut out = Vec::new();

        let outcome = tokio_test::block_on(downloader.download_audio("X", &mut out)).unwrap();

        assert_eq!(outcome, DownloadOutcome::Completed);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("{\"program\":\"yt-dlp\""));
        assert!(printed.ends_with("\"X\"],\"env\":[]}\n"));
    }
}
