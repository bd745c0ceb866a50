//! Process-wide logging setup for the back office.

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Initialize observability once at process start.
///
/// Calling it again is a no-op, so library consumers and the host can both
/// call it without coordinating.
pub fn init() {
    tracing::init();
}
