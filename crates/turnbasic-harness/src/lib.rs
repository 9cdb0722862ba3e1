#![forbid(unsafe_code)]

//! Test harness for turnbasic hosts.
//!
//! - [`ScriptEngine`] - a small deterministic engine for a line-numbered
//!   dialect, enough to exercise every driver path
//! - [`SessionSimulator`] - drives a [`Session`](turnbasic_runtime::Session)
//!   through its scheduler without a real clock
//! - [`init_test_logging`] - installs a `tracing` subscriber for tests

pub mod script_engine;
pub mod simulator;

pub use script_engine::{ScriptEngine, Value};
pub use simulator::SessionSimulator;

use tracing_subscriber::EnvFilter;

/// Install a test-writer `tracing` subscriber once.
///
/// The filter is read from `TURNBASIC_LOG` and defaults to `warn`. Later calls
/// are no-ops.
pub fn init_test_logging() {
    let filter =
        EnvFilter::try_from_env("TURNBASIC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
