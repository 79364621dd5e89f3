//! # lucy-logging
//!
//! Structured logging with `tracing`.
//!
//! - [`init_subscriber`] installs the process-wide stderr subscriber from
//!   [`LoggingSettings`]. `RUST_LOG` overrides the configured level.
//! - [`test_utils::capture_logs`] installs a thread-local capturing layer
//!   for assertions in tests.

#![deny(unsafe_code)]

pub mod test_utils;

pub use test_utils::{CapturedEvent, CapturedLogs, capture_logs};

use lucy_settings::{LogFormat, LoggingSettings};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber with stderr output.
///
/// Call once at application startup. Subsequent calls are no-ops.
pub fn init_subscriber(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_filter_str()));

    // try_init is a no-op if a global default is already set
    match settings.format {
        LogFormat::Compact => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact()
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .json()
                .try_init();
        }
    }
}
