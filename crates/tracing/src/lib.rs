//! Logging setup.
//!
//! A single entry point so every binary and test harness in the workspace
//! configures `tracing` the same way: an `EnvFilter` driven by
//! `RUST_LOG` (falling back to a sane default), formatted to stderr.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter directive used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a global `tracing` subscriber reading `RUST_LOG`, falling back
/// to [`DEFAULT_FILTER`].
///
/// Safe to call from a binary's `main`. Calling it twice in the same
/// process panics (tracing only allows one global default subscriber) -
/// tests should use [`test_subscriber`] instead, which is scoped.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    fmt().with_env_filter(filter).init();
}

/// Builds a subscriber for use with [`tracing::subscriber::set_default`] in
/// a single test, rather than installing a process-wide global.
pub fn test_subscriber() -> impl tracing::Subscriber + Send + Sync {
    fmt()
        .with_env_filter(EnvFilter::new(DEFAULT_FILTER))
        .with_test_writer()
        .finish()
}
