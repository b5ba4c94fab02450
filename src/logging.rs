//! Logging configuration and the reporting capability used by the extractor.
//!
//! The process installs at most one subscriber, built from a [`LogConfig`]
//! with zero, one or two sinks:
//!
//! - a file sink when a destination file is given (`DEBUG` in debug builds,
//!   `INFO` otherwise);
//! - a console sink on stderr when enabled (`WARN` and above).
//!
//! The extractor never touches this configuration. It logs through a
//! [`Reporter`], which by default forwards to whatever subscriber is current.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Sinks to enable for the process.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Append log lines to this file.
    pub destination_file: Option<PathBuf>,
    /// Mirror warnings and errors to stderr.
    pub enable_console: bool,
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to open log file {path:?}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("a global logger is already installed")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),
}

fn file_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

/// Build a subscriber for `config` without installing it.
///
/// # Errors
///
/// Returns [`LogError::OpenFile`] if the destination file cannot be opened
/// for appending.
pub fn subscriber(config: &LogConfig) -> Result<impl Subscriber + Send + Sync + 'static, LogError> {
    let file_layer = match &config.destination_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LogError::OpenFile {
                    path: path.clone(),
                    source,
                })?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_thread_ids(true)
                    .with_writer(Mutex::new(file))
                    .with_filter(file_level()),
            )
        }
        None => None,
    };

    let console_layer = config.enable_console.then(|| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_filter(LevelFilter::WARN)
    });

    Ok(tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer))
}

/// Install the subscriber for `config` as the process-wide default.
///
/// # Errors
///
/// Fails if the log file cannot be opened or a subscriber is already
/// installed.
pub fn init(config: &LogConfig) -> Result<(), LogError> {
    tracing::subscriber::set_global_default(subscriber(config)?)?;
    Ok(())
}

/// Minimal logging capability handed to the extractor.
pub trait Reporter {
    fn info(&self, message: &str);
    fn debug(&self, message: &str);
    fn error(&self, message: &str);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn info(&self, message: &str) {
        (**self).info(message)
    }

    fn debug(&self, message: &str) {
        (**self).debug(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }
}

/// Forwards to the current `tracing` dispatcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}
