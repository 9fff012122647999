//! Logging setup.
//!
//! Two sinks are installed on one `tracing` registry:
//! - a daily rolling file in `<data-dir>/Logs/`, filtered by the configured
//!   `log-level` (default "info")
//! - stderr, filtered by the `AGENDA_LOG` environment variable (default
//!   "warn") so command output on stdout stays clean

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, prelude::*, registry};

/// Environment variable holding the stderr log filter.
pub const LOG_ENV: &str = "AGENDA_LOG";

/// File name prefix of the log file.
const LOG_FILE_PREFIX: &str = "agenda";

fn stderr_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes and stops the file writer. When the log directory cannot be used
/// only the stderr sink is installed and `None` is returned.
pub fn init(log_dir: &Path, file_level: &str) -> Option<WorkerGuard> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(log_dir);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_filter());

    let (file_layer, guard, failure) = match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new(file_level));
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    let _ = registry().with(stderr_layer).with(file_layer).try_init();

    match failure {
        None => tracing::debug!(log_dir = %log_dir.display(), "file logging enabled"),
        Some(e) => {
            tracing::warn!(log_dir = %log_dir.display(), error = %e, "file logging unavailable, using stderr only");
        }
    }
    guard
}
