pub mod cli;
pub mod config;
pub mod core;
pub mod utils;

pub use config::Config;
pub use core::{
    CommandExecutor, CommandSpec, DownloadError, DownloadOutcome, Downloader, ProcessExecutor,
    Resolution,
};
