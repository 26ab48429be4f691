//! Logging utilities wrapping `tracing` initialisation

use crate::config::{LogRotation, LoggingOptions};
use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::OnceLock;
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Stream the console layer writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Console {
    /// Human-oriented runs
    Stdout,
    /// Runs whose stdout carries machine-readable output
    Stderr,
}

impl Console {
    /// Keep stdout clean when the report itself is printed as JSON.
    pub fn for_report(json: bool) -> Self {
        if json { Self::Stderr } else { Self::Stdout }
    }

    fn writer(self) -> BoxMakeWriter {
        match self {
            Self::Stdout => BoxMakeWriter::new(io::stdout),
            Self::Stderr => BoxMakeWriter::new(io::stderr),
        }
    }
}

/// Install the global subscriber: an `EnvFilter`, the console layer and,
/// when `options.file` is set, a non-blocking file layer.
///
/// Returns `Ok` without changes when a subscriber is already installed.
pub fn init(options: &LoggingOptions, console: Console) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let level = std::env::var("URQR_LOG_LEVEL").unwrap_or_else(|_| options.level.clone());
    let filter = EnvFilter::try_new(level.as_str())
        .map_err(|e| Error::Config(format!("Invalid log level '{level}': {e}")))?;

    let file = file_writer(options)?.map(|writer| {
        fmt::layer()
            .with_timer(UtcTime::rfc_3339())
            .with_ansi(false)
            .with_writer(writer)
    });
    let console = fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_ansi(options.color)
        .with_writer(console.writer());

    Registry::default()
        .with(filter)
        .with(file)
        .with(console)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {e}")))
}

/// Open the configured log sink, plain append or rolling.
fn file_writer(options: &LoggingOptions) -> Result<Option<NonBlocking>> {
    let Some(path) = options.file.as_deref() else {
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .map_err(|e| Error::Config(format!("Failed to create log directory {}: {e}", dir.display())))?;

    let builder = NonBlockingBuilder::default().lossy(false);
    let (writer, guard) = match options.rotation {
        Some(rotation) => {
            let name = path.file_name().ok_or_else(|| {
                Error::Config(format!(
                    "Log file path '{}' needs a filename for rotation",
                    path.display()
                ))
            })?;
            let appender = match rotation {
                LogRotation::Hourly => rolling::hourly(dir, name),
                LogRotation::Daily => rolling::daily(dir, name),
            };
            builder.finish(appender)
        }
        None => {
            let file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)
                .map_err(|e| {
                    Error::Config(format!("Failed to open log file {}: {e}", path.display()))
                })?;
            builder.finish(file)
        }
    };

    // First sink wins; later ones are only ever opened by tests.
    let _ = FILE_GUARD.set(guard);
    Ok(Some(writer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn json_reports_log_to_stderr() {
        assert_eq!(Console::for_report(true), Console::Stderr);
        assert_eq!(Console::for_report(false), Console::Stdout);
    }

    #[test]
    fn init_twice_is_ok() {
        let options = LoggingOptions {
            level: "warn".to_string(),
            color: false,
            ..LoggingOptions::default()
        };
        init(&options, Console::Stderr).unwrap();
        assert!(tracing::dispatcher::has_been_set());
        init(&options, Console::Stdout).unwrap();
    }

    #[test]
    fn no_file_means_no_writer() {
        let writer = file_writer(&LoggingOptions::default()).unwrap();
        assert!(writer.is_none());
    }

    #[test]
    fn plain_file_sink_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/urqr.log");
        let options = LoggingOptions {
            file: Some(path.clone()),
            ..LoggingOptions::default()
        };

        assert!(file_writer(&options).unwrap().is_some());
        assert!(path.exists());
    }

    #[test]
    fn rotation_needs_a_file_name() {
        let options = LoggingOptions {
            file: Some(PathBuf::from("/")),
            rotation: Some(LogRotation::Daily),
            ..LoggingOptions::default()
        };
        assert!(matches!(file_writer(&options), Err(Error::Config(_))));
    }
}
