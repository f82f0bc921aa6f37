//! Log setup: a daily rolling file under the app log directory plus stderr.
//!
//! `RUST_LOG` overrides the default filter. The returned guard flushes the
//! non-blocking file writer and must live as long as the app.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default directives when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Log file prefix; the appender adds the date suffix.
const LOG_FILE_PREFIX: &str = "latchkey.log";

/// Managed guard for the non-blocking file writer.
pub struct LogGuard {
    _writer: WorkerGuard,
}

/// Build the filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// Returns `None` if a subscriber is already installed (tests, or a second
/// call), in which case nothing changes.
pub fn init(log_dir: &Path) -> Option<LogGuard> {
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let installed = tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok();

    installed.then_some(LogGuard { _writer: guard })
}
