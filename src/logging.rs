use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_rolling_file::{RollingConditionBase, RollingFileAppender};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Guard wrapper that ensures logs are flushed on drop
pub struct LogGuard(Option<WorkerGuard>);

impl Drop for LogGuard {
    fn drop(&mut self) {
        if let Some(guard) = self.0.take() {
            // Explicitly drop the guard to flush logs
            drop(guard);
            // Give a delay to ensure flush completes
            std::thread::sleep(std::time::Duration::from_millis(200));
        }
    }
}

/// Initialize logging to console and, when a file path is configured, to a
/// rolling log file. `verbose` overrides the configured level with DEBUG.
/// Returns a LogGuard that must be kept alive for the duration of the program
pub fn init_logging(
    config: Option<&crate::config::LoggingConfig>,
    verbose: bool,
) -> Result<LogGuard, anyhow::Error> {
    let level = if verbose {
        Level::DEBUG
    } else if let Some(config) = config {
        match config.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" | "warning" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO, // Default to INFO for invalid levels
        }
    } else {
        Level::INFO // Default level when no config
    };

    let file_sink =
        config.and_then(|config| config.path.as_ref().map(|p| (p, config.size, config.max_files)));

    // Without a configured file path, only log to console
    let Some((path, size, max_files)) = file_sink else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stdout)
                    .with_ansi(true)
                    .with_filter(tracing_subscriber::filter::LevelFilter::from_level(level)),
            )
            .init();

        return Ok(LogGuard(None));
    };

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file_appender = RollingFileAppender::new(
        path,
        RollingConditionBase::new().max_size(size * 1024 * 1024),
        max_files,
    )
    .map_err(|e| anyhow::anyhow!("Failed to create rolling file appender: {}", e))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(true)
                .with_filter(tracing_subscriber::filter::LevelFilter::from_level(level)),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(tracing_subscriber::filter::LevelFilter::from_level(level)),
        )
        .init();

    Ok(LogGuard(Some(guard)))
}
