pub mod flow;

use crate::config::Config;
use crate::core::{
    CommandExecutor, DownloadOutcome, Downloader, DryRunExecutor, ProcessExecutor, ToolSettings,
};
use crate::utils::{ensure_output_dir, transcoder_location};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

pub use flow::{audio_flow, prompt, video_flow};

#[derive(Parser)]
#[command(name = "yt-grab")]
#[command(about = "Save YouTube audio as MP3 or video as MP4 using yt-dlp")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML config file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output directory (defaults to Downloads next to the executable)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Downloader program to run
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub downloader: Option<String>,

    /// Print the downloader command as JSON instead of running it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Exit with status 0 even when the downloader fails
    #[arg(long, global = true)]
    pub lenient_exit: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Download the best audio track and convert it to MP3
    Audio {
        /// Video URL (prompted for when omitted)
        #[arg(short, long)]
        url: Option<String>,
    },
    /// Download video up to a resolution, merged with audio into MP4
    Video {
        /// Video URL (prompted for when omitted)
        #[arg(short, long)]
        url: Option<String>,

        /// Maximum height such as 720, or 720p60 to also cap the frame rate
        #[arg(short, long)]
        resolution: Option<String>,
    },
}

impl Cli {
    /// Config file values with command-line overrides applied.
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(output) = &self.output {
            config.output_dir = Some(output.clone());
        }
        if let Some(downloader) = &self.downloader {
            config.downloader = downloader.clone();
        }
        if self.lenient_exit {
            config.strict_exit = false;
        }
        Ok(config)
    }

    pub async fn run(&self) -> Result<ExitCode> {
        let mut input = io::stdin().lock();
        let mut out = io::stdout();
        let code = self.run_with(&mut input, &mut out).await?;
        Ok(ExitCode::from(code))
    }

    /// Creates the output directory, runs the selected flow over the given
    /// streams and returns the process exit status.
    pub async fn run_with<R, W>(&self, input: &mut R, out: &mut W) -> Result<u8>
    where
        R: BufRead,
        W: Write + Send,
    {
        let config = self.config()?;
        debug!(?config, "configuration loaded");

        let output_dir = ensure_output_dir(&config.output_dir())?;
        info!(path = %output_dir.display(), "saving into");

        let settings = ToolSettings {
            program: config.downloader.clone(),
            output_dir,
            transcoder: transcoder_location(&config.transcoder_dir()),
            env: config.env_overrides(),
        };

        let tail = config.output_tail_lines;

        let outcome = if self.dry_run {
            let downloader = Downloader::new(DryRunExecutor, settings, tail);
            self.dispatch(&downloader, input, out).await?
        } else {
            let downloader = Downloader::new(ProcessExecutor::new(), settings, tail);
            self.dispatch(&downloader, input, out).await?
        };

        Ok(outcome.exit_code(config.strict_exit))
    }

    async fn dispatch<E, R, W>(
        &self,
        downloader: &Downloader<E>,
        input: &mut R,
        out: &mut W,
    ) -> Result<DownloadOutcome>
    where
        E: CommandExecutor,
        R: BufRead,
        W: Write + Send,
    {
        let outcome = match &self.command {
            Command::Audio { url } => audio_flow(downloader, url.as_deref(), input, out).await?,
            Command::Video { url, resolution } => {
                video_flow(
                    downloader,
                    url.as_deref(),
                    resolution.as_deref(),
                    input,
                    out,
                )
                .await?
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_subcommand_with_global_flags() {
        let cli = Cli::try_parse_from([
            "yt-grab", "video", "--url", "https://youtu.be/X", "-r", "720", "--dry-run", "-o", "/tmp/out",
        ])
        .unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/out")));
        match cli.command {
            Command::Video { url, resolution } => {
                assert_eq!(url.as_deref(), Some("https://youtu.be/X"));
                assert_eq!(resolution.as_deref(), Some("720"));
            }
            Command::Audio { .. } => panic!("expected video subcommand"),
        }
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let cli = Cli::try_parse_from([
            "yt-grab", "--lenient-exit", "--downloader", "/usr/bin/yt-dlp", "audio",
        ])
        .unwrap();
        let config = cli.config().unwrap();
        assert!(!config.strict_exit);
        assert_eq!(config.downloader, "/usr/bin/yt-dlp");
        assert!(matches!(cli.command, Command::Audio { url: None }));
    }
}
