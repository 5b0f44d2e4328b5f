//! Integration test crate for FrameState.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on every framestate crate to verify they work together.

#[cfg(test)]
mod session;

#[cfg(test)]
mod pool;

#[cfg(test)]
mod entropy;

/// Route `tracing` output to the test harness. Filter with `RUST_LOG`.
#[cfg(test)]
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
