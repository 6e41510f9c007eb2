use clap::Parser;
use std::process::ExitCode;
use tracing::{info, Level};
use yt_grab::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with the relayed downloader output
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting yt-grab v{}", env!("CARGO_PKG_VERSION"));

    cli.run().await
}
