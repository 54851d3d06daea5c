//! Oak Test Harness - Simulated runtime and end-to-end checks
//!
//! This crate provides:
//! - An in-memory device runtime implementing `CloudRuntime`
//! - Queued remote reads, function calls and inbound events
//! - Call recording for asserting what reached the runtime
//! - Compile-fail checks for misused variable registrations
//! - End-to-end integration tests

pub mod simulator;
pub mod misuse;

#[cfg(test)]
mod integration;

pub use simulator::*;

/// Install a `tracing` subscriber for tests, filtered by `RUST_LOG`
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
