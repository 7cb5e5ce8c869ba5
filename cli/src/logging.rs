//! File logging for the fanout binary.
//!
//! Logs go to `<data dir>/logs/fanout.log`; stderr is used when the file
//! cannot be opened, and additionally when `--tracing` is given.

use config::PathManager;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "info,fanout_core=debug,llm=debug,fanout::traffic=debug";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn open_log_file() -> Option<(File, PathBuf)> {
    let path = PathManager::log_file_path()?;
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("[fanout] Failed to create log directory {:?}: {}", parent, e);
            return None;
        }
    }

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => Some((file, path)),
        Err(e) => {
            eprintln!("[fanout] Failed to open log file {:?}: {}", path, e);
            None
        }
    }
}

/// Install the global subscriber. The returned guard flushes the file writer
/// on drop and must live until the program exits.
pub fn init_logging(mirror_to_stderr: bool) -> Option<WorkerGuard> {
    let Some((file, path)) = open_log_file() else {
        init_stderr_logging(mirror_to_stderr);
        return None;
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let stderr_layer = mirror_to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
    });

    let subscriber = tracing_subscriber::registry()
        .with(env_filter(DEFAULT_FILTER))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(stderr_layer);

    match tracing::subscriber::set_global_default(subscriber) {
        Ok(()) => tracing::info!("Logging initialized, writing to {:?}", path),
        Err(e) => eprintln!("[fanout] Failed to set tracing subscriber: {}", e),
    }
    Some(guard)
}

// Without a log file only warnings reach the terminal unless tracing was asked for
fn init_stderr_logging(verbose: bool) {
    let filter = env_filter(if verbose { DEFAULT_FILTER } else { "warn" });
    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true),
    );

    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_enables_traffic_log() {
        assert!(DEFAULT_FILTER.split(',').any(|directive| directive == "fanout::traffic=debug"));
        let filter = EnvFilter::try_new(DEFAULT_FILTER).unwrap();
        assert!(filter.to_string().contains("fanout::traffic=debug"));
    }
}
