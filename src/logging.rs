use crate::config::LoggingConfig;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes console and rolling JSON file logging.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("rooftop_finder=info"));

    if let Err(e) = fs::create_dir_all(&config.directory) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
        tracing::warn!(
            "Could not create log directory {}: {}; logging to console only",
            config.directory.display(),
            e
        );
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_name);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global subscriber can only be installed once per test binary, so
    // this is the only test that calls `init_logging`.
    #[test]
    fn installs_console_and_file_layers() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            directory: dir.path().join("logs"),
            file_name: "finder.log".to_string(),
            filter: "rooftop_finder=debug".to_string(),
        };

        let guard = init_logging(&config);
        assert!(guard.is_some());
        assert!(config.directory.is_dir());
        tracing::info!("logging initialized");
    }
}
