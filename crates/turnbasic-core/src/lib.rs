#![forbid(unsafe_code)]

//! Core: the engine protocol shared by the turnbasic driver and its hosts.
//!
//! An [`Engine`] executes a line-numbered BASIC dialect one bounded unit at a
//! time. This crate defines the contract the execution driver consumes:
//!
//! - [`ExecutionState`] - the four states an engine can report
//! - [`OutputEvent`] / [`OutputKind`] - the typed output channel
//! - [`OutputQueue`] - an ordered, drain-once queue engines can build on
//! - [`source`] - splitting program text into statement lines
//!
//! The grammar, evaluator and variable storage live behind the trait and are
//! not part of this crate.

pub mod engine;
pub mod logging;
pub mod output;
pub mod source;
pub mod state;

// Log macros live at the crate root in both configurations.
#[cfg(feature = "tracing")]
pub use logging::{debug, info, trace, warn};

pub use engine::{Engine, EngineOptions};
pub use output::{LineBreak, OutputEvent, OutputKind, OutputQueue};
pub use source::{ProgramSource, SourceLine};
pub use state::ExecutionState;
