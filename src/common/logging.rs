//! Diagnostic logging plus the persistent operations log.
//!
//! Diagnostics go to stderr through an `EnvFilter`. Real deletions are
//! recorded as `tracing` events on [`OPS_TARGET`], which a second layer
//! appends to `operations.log` in the log directory.

use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{EnvFilter, Targets};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Target of every operations-log event.
pub const OPS_TARGET: &str = "sweepsafe::ops";

/// Set to `1` to keep the operations log off disk.
pub const NO_OPLOG_ENV: &str = "SWEEPSAFE_NO_OPLOG";

pub const OPS_LOG_FILE: &str = "operations.log";

/// The log is moved aside to `operations.log.1` past this size.
const MAX_OPS_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Install the global subscriber. The returned guard flushes the operations
/// log when dropped and must live until the program exits.
pub fn init(verbose: bool, quiet: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let default_directive = if quiet {
        "error"
    } else if verbose {
        "sweepsafe=debug"
    } else {
        "sweepsafe=info,sweepsafe::ops=off"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    let (ops_layer, guard) = match log_dir.filter(|_| oplog_enabled()) {
        Some(dir) => match open_ops_log(dir) {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(false)
                    .with_filter(Targets::new().with_target(OPS_TARGET, Level::INFO));
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!("warning: operations log disabled: {}", e);
                (None, None)
            }
        },
        None => (None, None),
    };

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(ops_layer)
        .try_init();

    guard
}

fn oplog_enabled() -> bool {
    std::env::var(NO_OPLOG_ENV).map_or(true, |v| v != "1")
}

fn open_ops_log(dir: &Path) -> std::io::Result<tracing_appender::rolling::RollingFileAppender> {
    std::fs::create_dir_all(dir)?;
    rotate_if_needed(dir, MAX_OPS_LOG_BYTES)?;
    Ok(tracing_appender::rolling::never(dir, OPS_LOG_FILE))
}

/// Move an oversized log to `<name>.1`, replacing any older backup.
fn rotate_if_needed(dir: &Path, max_bytes: u64) -> std::io::Result<bool> {
    let current = dir.join(OPS_LOG_FILE);
    match std::fs::metadata(&current) {
        Ok(meta) if meta.len() > max_bytes => {
            std::fs::rename(&current, dir.join(format!("{}.1", OPS_LOG_FILE)))?;
            Ok(true)
        }
        Ok(_) => Ok(false),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
