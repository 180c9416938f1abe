use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{config::Config, error::Error};

/// Name of the log file written inside `Config::log_dir`
pub const LOG_FILE_NAME: &str = "corridors.log";

/// Installs the global tracing subscriber, writing to a file because the
/// terminal belongs to the renderer.
///
/// Keep the returned guard alive until exit, otherwise buffered lines are lost.
pub fn init(config: &Config) -> Result<WorkerGuard, Error> {
    let file_appender = tracing_appender::rolling::never(&config.log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(config.log_level)
        .finish()
        .try_init()?;
    tracing::info!(level = %config.log_level, dir = %config.log_dir.display(), "logging started");
    Ok(guard)
}
