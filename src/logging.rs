//! Logging setup
//!
//! Installs a `tracing` subscriber writing to stdout and, when enabled, to
//! `~/.settings-panel/logs/settings-panel.log`. `RUST_LOG` overrides the
//! configured level.

use crate::config::{get_panel_dir, LoggingConfig};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

/// Format timestamps using the system's local time via chrono
struct LocalTimer;

impl tracing_subscriber::fmt::time::FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Directory holding the log file
pub fn get_log_dir() -> PathBuf {
    get_panel_dir().join("logs")
}

/// Install the global subscriber
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level))
    };

    let log_file = if config.file_logging {
        let log_dir = get_log_dir();
        let _ = std::fs::create_dir_all(&log_dir);
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join("settings-panel.log"))
            .ok()
    } else {
        None
    };

    let stdout_layer = tracing_subscriber::fmt::layer().with_timer(LocalTimer);

    let result = if let Some(file) = log_file {
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_timer(LocalTimer)
            .with_ansi(false);
        tracing_subscriber::registry()
            .with(filter())
            .with(stdout_layer)
            .with(file_layer)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter())
            .with(stdout_layer)
            .try_init()
    };

    if result.is_ok() {
        tracing::info!("Settings panel logging initialised (level: {})", config.level);
    }
}
