//! Tracing setup.
//!
//! Logs go to stderr unless a log file is given, in which case they are
//! written through a non-blocking file appender. The returned guard must be
//! held for the lifetime of the program so buffered lines are flushed.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{ChatError, Result};

pub fn init(level: &str, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| ChatError::Config(format!("Invalid log level '{}': {}", level, e)))?;

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)?;
            let file_name = path
                .file_name()
                .ok_or_else(|| ChatError::Config(format!("Invalid log file {}", path.display())))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()
                .map_err(|e| ChatError::Config(format!("Failed to install subscriber: {}", e)))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| ChatError::Config(format!("Failed to install subscriber: {}", e)))?;
            Ok(None)
        }
    }
}
