//! Tracing/logging setup shared by binaries and tests embedding the ledger.

/// Initialize process-wide logging (JSON, `RUST_LOG`-filtered).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize logging routed through the test harness' captured output.
pub fn init_for_tests() {
    tracing::init_for_tests();
}

/// Tracing configuration (filters, layers).
pub mod tracing;
