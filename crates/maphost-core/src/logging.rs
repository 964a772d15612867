//! Logging init: file under XDG state dir, or graceful fallback to stderr.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,maphost_core=debug,maphost=debug";
const LOG_FILE: &str = "maphost.log";

/// Where log lines go. A file sink hands each event its own handle and
/// degrades to stderr for that event if the handle can't be cloned.
enum LogSink {
    File(File),
    Stderr,
}

enum SinkWriter {
    File(File),
    Stderr(io::Stderr),
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SinkWriter::File(f) => f.write(buf),
            SinkWriter::Stderr(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkWriter::File(f) => f.flush(),
            SinkWriter::Stderr(e) => e.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> SinkWriter {
        match self {
            LogSink::File(file) => file
                .try_clone()
                .map(SinkWriter::File)
                .unwrap_or_else(|_| SinkWriter::Stderr(io::stderr())),
            LogSink::Stderr => SinkWriter::Stderr(io::stderr()),
        }
    }
}

fn log_file_path() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix("maphost")?;
    let dir = dirs.get_state_home();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(dir.join(LOG_FILE))
}

fn install(sink: LogSink) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(sink)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))
}

/// Appends structured logs to `$XDG_STATE_HOME/maphost/maphost.log`.
/// Errors leave no subscriber installed so the caller can fall back to stderr.
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    install(LogSink::File(file))?;
    tracing::info!(path = %path.display(), "maphost logging initialized");
    Ok(())
}

/// Logs to stderr only. An already installed subscriber is left in place.
pub fn init_logging_stderr() {
    let _ = install(LogSink::Stderr);
}
