use std::path::PathBuf;

/// Directory holding rotated log files
pub fn log_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("Soundstage").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Initialize tracing with file rotation
///
/// Logs are written to the `Soundstage/logs` folder under the platform
/// config directory, one file per day (`soundstage.YYYY-MM-DD.log`).
/// Debug builds also log to the console.
///
/// The returned guard flushes the file writer on drop; keep it alive for
/// the life of the program.
pub fn initialize_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = log_dir();

    // Create log directory if it doesn't exist
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "soundstage.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Configure filter (info level by default)
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
    guard
}
