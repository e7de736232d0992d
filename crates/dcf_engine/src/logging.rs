//! Structured logging setup.
//!
//! The engine emits `tracing` events: run construction at `info`, sample
//! allocation, driver aggregation and metric completion at `debug`.
//! Libraries never install a subscriber on their own; binaries and tests
//! call [`init_logging`] once.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a formatting subscriber filtered by `RUST_LOG`, falling back
/// to `default_filter` (e.g. `"info"` or `"dcf_engine=debug"`).
///
/// Returns `false` if a global subscriber was already installed, in which
/// case the existing one is kept.
///
/// # Examples
///
/// ```rust
/// use dcf_engine::logging::init_logging;
///
/// init_logging("warn");
/// // A second call leaves the first subscriber in place.
/// assert!(!init_logging("debug"));
/// ```
pub fn init_logging(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
