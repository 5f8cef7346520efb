//! Logging bootstrap.

use crate::warning_layer::{LogNotice, WarningLayer};
use delve_core::config::{DEFAULT_LOG_LEVEL, LoggingConfig};
use delve_core::error::{DelveError, Result};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Log file created inside the configured directory.
pub const LOG_FILE_NAME: &str = "delve.log";

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. With a configured
/// directory, output is appended to `delve.log` there; otherwise it goes to
/// stderr. When `warnings` is given, WARN events are also forwarded to it.
///
/// # Returns
///
/// The log file path, if logging to a file.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global subscriber
/// is already installed.
pub fn init(
    config: &LoggingConfig,
    warnings: Option<mpsc::UnboundedSender<LogNotice>>,
) -> Result<Option<PathBuf>> {
    let filter = env_filter(&config.level);

    let (file_layer, stderr_layer, log_path) = match config.directory.as_deref() {
        Some(directory) => {
            let (appender, path) = log_appender(directory)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(appender);
            (Some(layer), None, Some(path))
        }
        None => {
            let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            (None, Some(layer), None)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .with(warnings.map(WarningLayer::new))
        .try_init()
        .map_err(|e| DelveError::internal(format!("failed to install logger: {}", e)))?;

    Ok(log_path)
}

/// `RUST_LOG` if set and valid, else `level`, else the default level.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Appender writing to a single, never-rotated `delve.log`.
fn log_appender(directory: &Path) -> Result<(RollingFileAppender, PathBuf)> {
    std::fs::create_dir_all(directory)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(directory)
        .map_err(|e| DelveError::io(format!("cannot open {}: {}", LOG_FILE_NAME, e)))?;
    Ok((appender, directory.join(LOG_FILE_NAME)))
}
