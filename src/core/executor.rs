use crate::core::command::CommandSpec;
use crate::core::error::{DownloadError, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::io;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: StreamKind,
    pub text: String,
}

/// How the child finished. `code` is `None` when it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    pub code: Option<i32>,
}

impl ExitReport {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub type LineSink<'a> = dyn FnMut(OutputLine) + Send + 'a;

/// Runs a command to completion, reporting each output line as it arrives.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, command: &CommandSpec, on_line: &mut LineSink<'_>) -> Result<ExitReport>;
}

/// Spawns the real downloader process.
#[derive(Debug, Default, Clone)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn run(&self, command: &CommandSpec, on_line: &mut LineSink<'_>) -> Result<ExitReport> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DownloadError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        debug!(pid = ?child.id(), command = %command.display(), "downloader started");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "child stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "child stderr was not captured"))?;

        // Drain both pipes together; lines arrive in the order they were written.
        let mut lines = stream::select(
            line_stream(BufReader::new(stdout), StreamKind::Stdout),
            line_stream(BufReader::new(stderr), StreamKind::Stderr),
        );
        while let Some(line) = lines.next().await {
            on_line(line?);
        }

        let status = child.wait().await?;
        debug!(code = ?status.code(), "downloader exited");

        Ok(ExitReport {
            code: status.code(),
        })
    }
}

/// Prints the command descriptor as JSON instead of running it.
#[derive(Debug, Default, Clone)]
pub struct DryRunExecutor;

#[async_trait]
impl CommandExecutor for DryRunExecutor {
    async fn run(&self, command: &CommandSpec, on_line: &mut LineSink<'_>) -> Result<ExitReport> {
        let json = serde_json::to_string(command).map_err(io::Error::from)?;
        on_line(OutputLine {
            stream: StreamKind::Stdout,
            text: json,
        });
        Ok(ExitReport { code: Some(0) })
    }
}

fn line_stream<R>(reader: R, kind: StreamKind) -> BoxStream<'static, io::Result<OutputLine>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    stream::unfold(Some(reader), move |state| async move {
        let mut reader = state?;
        match read_segment(&mut reader).await {
            Ok(Some(text)) => Some((Ok(OutputLine { stream: kind, text }), Some(reader))),
            Ok(None) => None,
            Err(e) => Some((Err(e), None)),
        }
    })
    .boxed()
}

/// Reads up to the next `\n` or `\r`.
///
/// Progress bars redraw with a bare carriage return, so splitting on it
/// lets each update through as soon as it is written. Empty segments are
/// skipped and invalid UTF-8 is replaced.
pub async fn read_segment<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut segment = Vec::new();
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(if segment.is_empty() {
                None
            } else {
                Some(String::from_utf8_lossy(&segment).into_owned())
            });
        }

        match buf.iter().position(|b| *b == b'\n' || *b == b'\r') {
            Some(end) => {
                segment.extend_from_slice(&buf[..end]);
                reader.consume(end + 1);
                if !segment.is_empty() {
                    return Ok(Some(String::from_utf8_lossy(&segment).into_owned()));
                }
            }
            None => {
                let len = buf.len();
                segment.extend_from_slice(buf);
                reader.consume(len);
            }
        }
    }
}
