//! Cadence Test Harness - Alignment validation
//!
//! This crate provides:
//! - A reference oracle for duration and UTC calendar grids
//! - A seeded grid simulator that checks alignment invariants
//! - Property-based tests over random origins and intervals
//! - Log setup for tests and benchmarks

pub mod grid_simulator;
pub mod oracle;

#[cfg(test)]
mod proptest_align;

pub use grid_simulator::*;
pub use oracle::*;

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG` (default `warn`).
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
