//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize JSON logging for the process.
///
/// The filter comes from `RUST_LOG` (default `info`). Safe to call more
/// than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_target(false)
        .try_init();
}
