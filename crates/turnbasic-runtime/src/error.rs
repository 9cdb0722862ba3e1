#![forbid(unsafe_code)]

//! Driver contract violations.
//!
//! Program errors are not faults: an engine that reports
//! [`ExecutionState::Errored`] has its message rendered to the console and the
//! session carries on. A [`DriverFault`] means the caller (or the engine)
//! broke the turn-taking contract. State checks fail before any side effect.
//! An engine fault found mid-operation stops it where it is. Faults never
//! reach the console.

use core::fmt;

use turnbasic_core::ExecutionState;

/// Driver operation named in an [`DriverFault::InvalidState`] fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `Driver::submit`.
    Submit,
    /// `Driver::break_execution`.
    Break,
    /// `Driver::load_program`.
    Load,
}

impl Operation {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Break => "break",
            Self::Load => "load",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turn-taking contract violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverFault {
    /// The operation is not allowed in the engine's current state.
    InvalidState {
        /// Rejected operation.
        operation: Operation,
        /// State at the time of the call.
        state: ExecutionState,
    },
    /// Submission while idle after a batch program finished.
    InputDisabled,
    /// The engine reported `Errored` but had no message.
    MissingError,
    /// The engine reported `Errored` with an empty message.
    EmptyError,
}

impl fmt::Display for DriverFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidState { operation, state } => {
                write!(f, "{operation} is not allowed while {state}")
            }
            Self::InputDisabled => f.write_str("input is disabled"),
            Self::MissingError => f.write_str("engine is errored but reported no error"),
            Self::EmptyError => f.write_str("engine reported an empty error"),
        }
    }
}

impl std::error::Error for DriverFault {}

/// Result alias for driver operations.
pub type DriverResult<T> = Result<T, DriverFault>;
