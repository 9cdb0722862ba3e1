#![forbid(unsafe_code)]

//! Runtime: cooperative turn-taking for turnbasic engines.
//!
//! The host never blocks while a program runs. Instead it asks the
//! [`Driver`] to take one turn at a time and schedules the next turn itself:
//!
//! - [`Driver`] - owns the engine and console, and maps engine states onto
//!   prompts, diagnostics and [`TurnOutcome`]s
//! - [`TurnScheduler`] - host-advanced clock deciding when a turn is due
//! - [`Session`] - driver + history + scheduler, the surface a UI binds to
//! - [`DriverConfig`] / [`SessionConfig`] - builder and environment config
//!
//! # Example
//!
//! ```ignore
//! use core::time::Duration;
//! use turnbasic_runtime::{Session, SessionConfig};
//!
//! let mut session = Session::new(engine, SessionConfig::default());
//! session.load_program("10 PRINT 1+2\n")?;
//! loop {
//!     session.advance_time(Duration::from_millis(16));
//!     match session.poll()? {
//!         Some(outcome) if !outcome.is_running() => break,
//!         _ => {}
//!     }
//! }
//! ```

pub mod config;
pub mod debug_trace;
pub mod driver;
pub mod error;
pub mod scheduler;
pub mod session;

pub use config::{ConfigError, DriverConfig, SessionConfig};
pub use driver::{Driver, TurnOutcome};
pub use error::{DriverFault, DriverResult, Operation};
pub use scheduler::TurnScheduler;
pub use session::Session;
