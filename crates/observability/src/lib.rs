//! Tracing and logging setup shared by the binaries.

/// Tracing configuration (filters, formatters).
pub mod tracing;

pub use self::tracing::LogFormat;

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}
