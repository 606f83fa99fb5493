//! Logging setup using `tracing-subscriber` and `tracing-appender`.
//!
//! Two modes:
//! - **Production** ([`init_production`]): JSON file layer (daily rotation) + console layer
//! - **CLI** ([`init_cli`]): console-only
//!
//! `RUST_LOG` wins over the configured level in both modes.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// File name prefix for rotated logs.
pub const LOG_FILE_PREFIX: &str = "drugshift.log";

/// Holds the non-blocking writer guard for file logging.
///
/// The [`WorkerGuard`] must be kept alive for the duration of the process.
/// Dropping it flushes pending log entries and closes the file.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

/// Build the filter: `RUST_LOG` if set and valid, else `level`, else `info`.
///
/// The second value describes a rejected directive; it is logged as a
/// warning once the subscriber is installed.
pub fn env_filter(level: &str) -> (EnvFilter, Option<String>) {
    build_filter(std::env::var("RUST_LOG").ok().as_deref(), level)
}

/// [`env_filter`] with an explicit `RUST_LOG` value.
pub fn build_filter(rust_log: Option<&str>, level: &str) -> (EnvFilter, Option<String>) {
    let mut rejected = None;

    if let Some(directive) = rust_log.filter(|d| !d.trim().is_empty()) {
        match EnvFilter::try_new(directive) {
            Ok(filter) => return (filter, None),
            Err(e) => rejected = Some(format!("invalid RUST_LOG {directive:?}: {e}")),
        }
    }

    match EnvFilter::try_new(level) {
        Ok(filter) => (filter, rejected),
        Err(e) => {
            let message = format!("invalid log level {level:?}: {e}");
            let message = match rejected {
                Some(first) => format!("{first}; {message}"),
                None => message,
            };
            (EnvFilter::new("info"), Some(message))
        }
    }
}

fn warn_rejected(rejected: Option<String>) {
    if let Some(reason) = rejected {
        tracing::warn!(reason = %reason, "invalid log directive, falling back");
    }
}

/// Initialise logging for the long-running bot.
///
/// Writes JSON logs to `{logs_dir}/drugshift.log.YYYY-MM-DD` with daily
/// rotation, plus human-readable output on stderr.
///
/// # Errors
///
/// Returns an error if the logs directory cannot be created or a global
/// subscriber is already installed.
pub fn init_production(logs_dir: &Path, level: &str) -> anyhow::Result<LoggingGuard> {
    std::fs::create_dir_all(logs_dir).map_err(|e| {
        anyhow::anyhow!(
            "failed to create logs directory {}: {e}",
            logs_dir.display()
        )
    })?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking);

    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let (filter, rejected) = env_filter(level);

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;
    warn_rejected(rejected);

    Ok(LoggingGuard { _guard: guard })
}

/// Initialise console-only logging on stderr.
pub fn init_cli(level: &str) {
    let (filter, rejected) = env_filter(level);
    // Ignore the error: a subscriber may already be installed in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    warn_rejected(rejected);
}
