//! Tracing setup.
//!
//! `RELAY_LOG` takes precedence over `log.level` from the config. The
//! dashboard owns the terminal, so it logs to a file; headless commands log
//! to stderr.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "RELAY_LOG";

fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(config.log.level.trim()))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Routes logs to stderr. Does nothing if a subscriber is already set.
pub fn init_stderr(config: &Config) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(env_filter(config))
        .try_init();
}

/// Routes logs to the configured log file.
///
/// The returned guard flushes buffered records on drop; keep it alive for the
/// lifetime of the dashboard.
pub fn init_file(config: &Config) -> Result<WorkerGuard> {
    let path = config.log_file();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create log directory {}", dir.display()))?;
    let file_name = path
        .file_name()
        .with_context(|| format!("log file path has no file name: {}", path.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .with(env_filter(config))
        .try_init();

    Ok(guard)
}
