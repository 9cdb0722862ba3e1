#![forbid(unsafe_code)]

//! The engine contract consumed by the execution driver.
//!
//! An engine never blocks. Every method returns after a bounded amount of
//! work, and anything that would wait (an `INPUT` statement, a long loop) is
//! expressed through [`ExecutionState`] instead. The driver calls
//! [`Engine::continue_evaluating`] once per turn while the engine reports
//! [`ExecutionState::Running`].
//!
//! Errors are not returned from the mutating calls. An engine that fails
//! reports [`ExecutionState::Errored`] until the driver collects the message
//! with [`Engine::take_latest_error`].

use crate::output::OutputEvent;
use crate::state::ExecutionState;

/// Optional engine behaviours a host can switch on at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineOptions {
    /// Emit `Warning` events for suspicious but legal programs.
    pub warnings: bool,
    /// Emit a `Trace` event before each numbered line executes.
    pub tracing: bool,
}

impl EngineOptions {
    /// Enable or disable warnings (builder).
    #[must_use]
    pub const fn with_warnings(mut self, enabled: bool) -> Self {
        self.warnings = enabled;
        self
    }

    /// Enable or disable line tracing (builder).
    #[must_use]
    pub const fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }
}

/// A line-numbered BASIC interpreter driven one bounded step at a time.
pub trait Engine {
    /// Current execution state.
    fn state(&self) -> ExecutionState;

    /// Begin evaluating one line: an immediate statement, a command such as
    /// `RUN`, or a numbered program-edit line.
    ///
    /// Only called in [`ExecutionState::Idle`].
    fn start_evaluating(&mut self, line: &str);

    /// Advance by one bounded unit of work.
    ///
    /// Only called in [`ExecutionState::Running`].
    fn continue_evaluating(&mut self);

    /// Satisfy a pending `INPUT` request.
    ///
    /// Only called in [`ExecutionState::AwaitingInput`].
    fn provide_input(&mut self, value: &str);

    /// Halt at the next statement boundary.
    ///
    /// Expression evaluation is never interrupted; the request takes effect
    /// between statements.
    fn break_at_current_location(&mut self);

    /// Drain output produced since the previous call.
    fn take_latest_output(&mut self) -> Vec<OutputEvent>;

    /// Drain the pending error message.
    ///
    /// Returns `Some` with non-empty text whenever the state is
    /// [`ExecutionState::Errored`].
    fn take_latest_error(&mut self) -> Option<String>;

    /// Seed the random number generator. Called once per session.
    fn seed_randomness(&mut self, seed: u64);

    /// Apply host-selected options. Engines without such switches can ignore
    /// this.
    fn apply_options(&mut self, options: &EngineOptions) {
        let _ = options;
    }
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn state(&self) -> ExecutionState {
        (**self).state()
    }

    fn start_evaluating(&mut self, line: &str) {
        (**self).start_evaluating(line);
    }

    fn continue_evaluating(&mut self) {
        (**self).continue_evaluating();
    }

    fn provide_input(&mut self, value: &str) {
        (**self).provide_input(value);
    }

    fn break_at_current_location(&mut self) {
        (**self).break_at_current_location();
    }

    fn take_latest_output(&mut self) -> Vec<OutputEvent> {
        (**self).take_latest_output()
    }

    fn take_latest_error(&mut self) -> Option<String> {
        (**self).take_latest_error()
    }

    fn seed_randomness(&mut self, seed: u64) {
        (**self).seed_randomness(seed);
    }

    fn apply_options(&mut self, options: &EngineOptions) {
        (**self).apply_options(options);
    }
}
