//! File logging for the TUI. The terminal belongs to ratatui, so nothing
//! is ever written to stdout or stderr while the app runs.

use pomidor_core::paths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over `level`.
///
/// The returned guard must live until exit so buffered lines get flushed.
pub fn init(level: &str) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let log_path = paths::log_file()?;
    let dir = log_path.parent()?;
    if std::fs::create_dir_all(dir).is_err() {
        return None;
    }
    let file_name = log_path.file_name()?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .init();

    tracing::info!(log_file = ?log_path, "Logging initialized");
    Some(guard)
}
