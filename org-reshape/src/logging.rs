//! Tracing setup for the reshape tools.
use std::env;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::errors::ReshapeError;

pub const DEFAULT_LOG_FILTER: &str = "org_reshape=info,org_reshape_pipeline=info";

/// Installs the global subscriber.
///
/// Console output is JSON when `LOG_FORMAT=json` and pretty otherwise. When
/// `log_file` is set every event is also appended to that file; the returned
/// guard must be held until exit so buffered lines get flushed.
pub fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>, ReshapeError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console = if json_requested() {
        fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).pretty().boxed()
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (directory, file_name) = split_log_path(path)?;
            std::fs::create_dir_all(&directory)?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| ReshapeError::Logging(e.to_string()))?;

    Ok(guard)
}

fn json_requested() -> bool {
    env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Splits a log file path into the directory to write in and the file name.
/// A bare file name is placed in the working directory.
fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf), ReshapeError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| ReshapeError::Config(format!("log file '{}' has no file name", path.display())))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((directory, PathBuf::from(file_name)))
}
