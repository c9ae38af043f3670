//! Process-wide tracing/logging setup for billing services and tests.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// JSON lines to stderr-compatible output, filtered via `RUST_LOG`
/// (defaults to `info`). Safe to call multiple times; subsequent calls
/// become no-ops, so shared test setup can call it unconditionally.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
