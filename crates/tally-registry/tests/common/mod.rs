//! Shared helpers for registry integration tests.

#![allow(dead_code)]

use tracing_subscriber::{fmt, EnvFilter};

/// Route `tracing` output to the test harness. Controlled by `RUST_LOG`.
pub fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 2023-11-14T22:13:20Z in nanoseconds.
pub const TS: u64 = 1_700_000_000_000_000_000;
