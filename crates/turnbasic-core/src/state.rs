#![forbid(unsafe_code)]

//! Engine execution state.

use core::fmt;

/// Condition an engine reports after each call.
///
/// Exactly one state holds at a time. Drivers must ask the engine for it
/// after every call rather than remembering a previous answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionState {
    /// Nothing is executing; the engine accepts a new top-level line.
    #[default]
    Idle,
    /// A program is executing and needs more `continue_evaluating` calls.
    Running,
    /// An `INPUT` statement is waiting for a value.
    AwaitingInput,
    /// The last call failed; the error must be taken before anything else.
    Errored,
}

impl ExecutionState {
    /// All states, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Idle,
        Self::Running,
        Self::AwaitingInput,
        Self::Errored,
    ];

    /// Whether a line may be submitted in this state.
    #[must_use]
    pub const fn accepts_submission(self) -> bool {
        matches!(self, Self::Idle | Self::AwaitingInput)
    }

    /// Whether a break request can take effect in this state.
    #[must_use]
    pub const fn accepts_break(self) -> bool {
        matches!(self, Self::Running | Self::AwaitingInput)
    }

    /// Stable lowercase name, used in logs and fault messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::AwaitingInput => "awaiting-input",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
