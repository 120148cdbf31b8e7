use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{DateTime, Utc};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logger thread handles, which must be kept alive for as long as the logging targets will be used.
/// Flushed automatically when dropped.
pub struct LoggingGuards {
    _stdout: WorkerGuard,
    _file: Option<WorkerGuard>,
}

/// Current UTC time with seconds, with characters that would be invalid
/// in a Windows file name removed.
pub fn default_run_name() -> String {
    DateTime::<Utc>::from(SystemTime::now())
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
        .replace(":", "")
}

/// Set up terminal logging, and file logging at `<log_root>/logs/<run_name>.log`
/// if a directory is given.
///
/// Returns the log file path, if any, and the writer guards.
/// Fails if a global subscriber is already installed.
pub fn init_logging(
    log_root: Option<&Path>,
    run_name: &str,
) -> Result<(Option<PathBuf>, LoggingGuards), String> {
    // Build file writer
    let (log_path, file_writer) = match log_root {
        Some(root) => {
            let log_dir = root.join("logs");
            fs::create_dir_all(&log_dir)
                .map_err(|e| format!("Failed to create log directory: {e}"))?;
            let log_path = log_dir.join(format!("{run_name}.log"));
            let logfile = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .map_err(|e| format!("Failed to create log file: {e}"))?;
            (Some(log_path), Some(tracing_appender::non_blocking(logfile)))
        }
        None => (None, None),
    };
    let (file_writer, file_guard) = match file_writer {
        Some((writer, guard)) => (Some(writer), Some(guard)),
        None => (None, None),
    };

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());

    // Filter for log level
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| format!("Failed to set up logging env filter: {e}"))?;

    // Formatting for terminal logger
    let stdout_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::rfc_3339())
        .with_writer(stdout_writer)
        .with_target(false);

    // Plain-text file logger
    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .with_writer(writer)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {e}"))?;

    let guards = LoggingGuards {
        _stdout: stdout_guard,
        _file: file_guard,
    };

    Ok((log_path, guards))
}
