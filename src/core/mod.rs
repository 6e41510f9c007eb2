pub mod command;
pub mod downloader;
pub mod error;
pub mod executor;
pub mod resolution;

pub use command::{audio_command, video_command, CommandSpec, ToolSettings};
pub use downloader::{DownloadOutcome, Downloader};
pub use error::DownloadError;
pub use executor::{
    CommandExecutor, DryRunExecutor, ExitReport, LineSink, OutputLine, ProcessExecutor, StreamKind,
};
pub use resolution::{clean_resolution, Resolution, AVAILABLE_RESOLUTIONS};
