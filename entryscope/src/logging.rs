use anyhow::Result;
use std::path::Path;
use std::sync::OnceLock;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::config::LogLevel;

static INIT_GUARD: OnceLock<()> = OnceLock::new();

/// Install the process-wide subscriber once; later calls are no-ops.
///
/// `RUST_LOG` wins over `level` when set. With logging disabled no
/// subscriber is installed at all.
pub fn initialize_logging(enabled: bool, level: LogLevel, log_file: Option<&Path>) -> Result<()> {
    if INIT_GUARD.set(()).is_err() {
        // Already initialized elsewhere; do nothing and succeed
        return Ok(());
    }

    if !enabled {
        return Ok(());
    }

    let filter = || {
        EnvFilter::builder()
            .with_default_directive(level.to_tracing_level_filter().into())
            .from_env_lossy()
    };

    let Some(log_path) = log_file else {
        init_stderr(filter());
        return Ok(());
    };

    // Try to create log file, but continue if it fails
    let maybe_log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path);

    match maybe_log_file {
        Ok(log_file) => {
            let file_subscriber = tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::sync::Mutex::new(log_file))
                .with_target(true)
                .with_ansi(false)
                .with_filter(filter());

            let init_res = tracing_subscriber::registry()
                .with(file_subscriber)
                .try_init();
            let _ = init_res; // ignore AlreadyInit errors silently
        }
        Err(e) => {
            // Fallback to stderr only if file creation fails
            init_stderr(filter());
            tracing::warn!(
                "Cannot open log file '{}': {}; logging to stderr",
                log_path.display(),
                e
            );
        }
    }

    Ok(())
}

fn init_stderr(filter: EnvFilter) {
    let init_res = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_env_filter(filter)
        .try_init();
    let _ = init_res;
}
