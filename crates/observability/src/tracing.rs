//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber: JSON lines with timestamps, level
/// filtered through `RUST_LOG` (falling back to `info`).
///
/// Uses `try_init` so a second call, or a test harness that installed its
/// own subscriber first, degrades to a no-op instead of panicking.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .json()
        .try_init();
}
