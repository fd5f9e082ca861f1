//! Common test utilities for codegraph-flow
//!
//! Shared programs, processors and reference solvers for the integration
//! and property tests.

#![allow(dead_code, unused_imports)]

mod assertions;
mod builders;
mod fixtures;
mod mini_program;

// Re-export all utilities
pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use mini_program::*;

/// Route solver logs to the test harness (`RUST_LOG=codegraph_flow=debug`)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
