//! Logging Infrastructure
//!
//! Structured logging setup for both development and production.

use std::path::Path;

/// Initialize the logger from `LOG_LEVEL` / `LOG_DIR` env vars
pub fn init_logger() {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with(&level, log_dir.as_deref());
}

/// Initialize the logger with explicit level and optional file output
pub fn init_logger_with(log_level: &str, log_dir: Option<&str>) {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level.parse().unwrap_or(tracing::Level::INFO))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // Add file output if log_dir is provided and exists
    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "karvon-server");
            subscriber.with_writer(file_appender).init();
            return;
        }
    }

    subscriber.init();
}
