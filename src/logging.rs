//! Opt-in tracing initialization for host programs.
//!
//! The engine itself only emits `tracing` events; hosts that already run a
//! subscriber get them for free. Hosts without one can call `init` for
//! dual output:
//! - **JSONL to file** (`~/.regex-kit/logs/regex-kit.jsonl`) - structured,
//!   one JSON object per line
//! - **Pretty to stderr** - human-readable
//!
//! Filtering follows `RUST_LOG`, defaulting to `info`. The returned guard
//! must stay alive for the duration of the program; dropping it flushes
//! the file writer.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Keep this alive for the duration of the program; dropping it flushes
/// and closes the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize dual-output logging in the default log directory.
pub fn init() -> LoggingGuard {
    init_with_dir(default_log_dir())
}

/// Initialize dual-output logging with logs under `log_dir`.
///
/// Degrades gracefully: if the directory or file cannot be created, only
/// the stderr output is installed. Calling this when a global subscriber
/// is already set is a no-op (the existing subscriber wins).
pub fn init_with_dir(log_dir: PathBuf) -> LoggingGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[regex-kit] Failed to create log directory: {}", e);
    }
    let log_path = log_dir.join("regex-kit.jsonl");

    // The stderr layer is built per branch: its type is generic over the
    // subscriber it stacks onto, and the two branches stack differently.
    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let file_layer = fmt::layer().json().with_writer(writer);
            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(stderr_layer)
                .try_init();
            LoggingGuard {
                _file_guard: Some(guard),
            }
        }
        Err(e) => {
            eprintln!(
                "[regex-kit] Failed to open {}: {}, logging to stderr only",
                log_path.display(),
                e
            );
            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .try_init();
            LoggingGuard { _file_guard: None }
        }
    }
}

fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".regex-kit")
        .join("logs")
}
