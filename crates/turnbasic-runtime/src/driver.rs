#![forbid(unsafe_code)]

//! Cooperative turn-taking execution driver.
//!
//! The [`Driver`] owns an [`Engine`] and a [`ConsoleModel`] and moves a
//! program forward one bounded turn at a time. Each turn drains the engine's
//! output into the console first, then acts on the state the engine reports:
//!
//! | Engine state    | Turn behaviour                                           |
//! |-----------------|----------------------------------------------------------|
//! | `Idle`          | show the idle prompt, or disable input after a batch run |
//! | `AwaitingInput` | show the input prompt                                    |
//! | `Errored`       | render the error, then re-read the state                 |
//! | `Running`       | advance the engine once and ask to be called again       |
//!
//! The driver never sleeps and never loops on a running engine. The host owns
//! the schedule and calls [`Driver::take_turn`] again after
//! [`TurnOutcome::reschedule_after`].
//!
//! # Modes
//!
//! A program supplied through [`Driver::load_program`] runs in *batch* mode:
//! when it finishes, input is disabled instead of prompting. A break, a host
//! failure, or [`DriverConfig::interactive_after_load`] makes the session
//! *fully interactive*, after which finishing always returns to a prompt.

use core::time::Duration;

use turnbasic_console::{ConsoleModel, DiagnosticClass};
use turnbasic_core::{Engine, ExecutionState, LineBreak, OutputEvent, ProgramSource, SourceLine};

use crate::config::{DriverConfig, MIN_TURN_DELAY};
use crate::debug_trace;
use crate::error::{DriverFault, DriverResult, Operation};

/// Command submitted after a batch program has been fed to the engine.
const RUN_COMMAND: &str = "RUN";

/// What the host should do after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The engine is idle. `input_enabled` is false once a batch program has
    /// finished and the session is not interactive.
    Idle {
        /// Whether the console accepts typing.
        input_enabled: bool,
    },
    /// The engine waits for an `INPUT` value.
    AwaitingInput,
    /// The program is still running; take another turn after `resume_after`.
    Running {
        /// Cooperative delay before the next turn. Never zero.
        resume_after: Duration,
    },
}

impl TurnOutcome {
    /// Delay before the next turn, or `None` when the driver is suspended
    /// until the host submits something.
    #[must_use]
    pub const fn reschedule_after(&self) -> Option<Duration> {
        match *self {
            Self::Running { resume_after } => Some(resume_after),
            Self::Idle { .. } | Self::AwaitingInput => None,
        }
    }

    /// Whether the program is still running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Turn-taking driver for one engine and one console.
#[derive(Debug)]
pub struct Driver<E> {
    engine: E,
    console: ConsoleModel,
    config: DriverConfig,
    seed: u64,
    batch_loaded: bool,
    interactive: bool,
    turns: u64,
}

impl<E: Engine> Driver<E> {
    /// Wrap `engine`, apply engine options, seed it once, and show the idle
    /// prompt.
    ///
    /// A `turn_delay` below [`MIN_TURN_DELAY`] is raised to it, however the
    /// config was built.
    pub fn new(mut engine: E, mut config: DriverConfig) -> Self {
        config.turn_delay = config.turn_delay.max(MIN_TURN_DELAY);
        engine.apply_options(&config.engine_options);
        let seed = config.seed.unwrap_or_else(wall_clock_seed);
        engine.seed_randomness(seed);

        let mut console = ConsoleModel::new();
        if let Some(limit) = config.scrollback_limit {
            console = console.with_scrollback_limit(limit);
        }
        console.set_prompt(config.idle_prompt.clone());

        turnbasic_core::debug!(
            seed,
            warnings = config.engine_options.warnings,
            tracing = config.engine_options.tracing,
            "driver created"
        );

        Self {
            engine,
            console,
            interactive: config.interactive_after_load,
            config,
            seed,
            batch_loaded: false,
            turns: 0,
        }
    }

    // --- Protocol ---

    /// Current engine state. Always read fresh from the engine.
    #[must_use]
    pub fn state(&self) -> ExecutionState {
        self.engine.state()
    }

    /// Feed a whole program to the engine and start it with `RUN`.
    ///
    /// Only numbered lines reach the engine. Other non-blank lines are
    /// reported as warnings naming their physical line; blank lines are
    /// skipped. Errors the engine reports while a line is stored are rendered
    /// and loading continues. Afterwards the session is in batch mode.
    ///
    /// Only the state check happens before any side effect. An engine that
    /// reports `Errored` without a usable message aborts the load part way:
    /// earlier lines stay stored and `RUN` is not sent.
    pub fn load_program(&mut self, text: &str) -> DriverResult<TurnOutcome> {
        let state = self.engine.state();
        if state != ExecutionState::Idle {
            return Err(self.fault(DriverFault::InvalidState {
                operation: Operation::Load,
                state,
            }));
        }

        self.console.clear_prompt();
        let source = ProgramSource::parse(text);
        let mut fed = 0usize;
        for line in source.lines() {
            match *line {
                SourceLine::Blank { .. } => {}
                SourceLine::Discarded { physical, .. } => {
                    turnbasic_core::info!(physical, "discarding unnumbered line");
                    self.console.println_classified(
                        &format!("WARNING: Line {physical} is not a numbered line, ignoring it."),
                        DiagnosticClass::Warning,
                    );
                }
                SourceLine::Statement { text, .. } => {
                    self.engine.start_evaluating(text);
                    fed += 1;
                    self.drain_output();
                    self.settle_errors()?;
                }
            }
        }

        debug_trace!("loaded {} lines, starting program", fed);
        self.batch_loaded = true;
        if self.engine.state() == ExecutionState::Idle {
            self.engine.start_evaluating(RUN_COMMAND);
        }
        self.take_turn()
    }

    /// Submit a line of input.
    ///
    /// In `Idle` the line is a new command; in `AwaitingInput` it answers the
    /// pending `INPUT`. The prompt is cleared and a turn is taken at once.
    pub fn submit(&mut self, input: &str) -> DriverResult<TurnOutcome> {
        let state = self.check_submit()?;
        self.console.clear_prompt();
        match state {
            ExecutionState::AwaitingInput => self.engine.provide_input(input),
            _ => self.engine.start_evaluating(input),
        }
        self.take_turn()
    }

    /// Validate a submission without performing it.
    ///
    /// Returns the state the submission would be made in.
    pub fn check_submit(&self) -> DriverResult<ExecutionState> {
        let state = self.engine.state();
        if !state.accepts_submission() {
            return Err(self.fault(DriverFault::InvalidState {
                operation: Operation::Submit,
                state,
            }));
        }
        if state == ExecutionState::Idle && !self.console.is_input_enabled() {
            return Err(self.fault(DriverFault::InputDisabled));
        }
        Ok(state)
    }

    /// Interrupt a running or waiting program.
    ///
    /// Commits the prompt line with the break marker, asks the engine to halt
    /// at the next statement boundary, makes the session fully interactive,
    /// and takes a turn. Returns `Ok(None)` without doing anything when idle.
    pub fn break_execution(&mut self) -> DriverResult<Option<TurnOutcome>> {
        let state = self.engine.state();
        if state == ExecutionState::Idle {
            return Ok(None);
        }
        if !state.accepts_break() {
            return Err(self.fault(DriverFault::InvalidState {
                operation: Operation::Break,
                state,
            }));
        }
        turnbasic_core::debug!(%state, "break requested");
        self.console.commit_prompt_to_output(&self.config.break_marker);
        self.engine.break_at_current_location();
        self.interactive = true;
        self.take_turn().map(Some)
    }

    /// Take one turn: drain output, then act on the engine state.
    pub fn take_turn(&mut self) -> DriverResult<TurnOutcome> {
        self.turns += 1;
        self.drain_output();
        self.settle_errors()?;

        let state = self.engine.state();
        let outcome = match state {
            ExecutionState::Idle => self.settle_idle(),
            ExecutionState::AwaitingInput => {
                self.console.set_prompt(self.config.input_prompt.clone());
                TurnOutcome::AwaitingInput
            }
            ExecutionState::Running => {
                self.engine.continue_evaluating();
                TurnOutcome::Running {
                    resume_after: self.config.turn_delay,
                }
            }
            ExecutionState::Errored => return Err(self.fault(DriverFault::MissingError)),
        };

        debug_trace!("turn {} in {} -> {:?}", self.turns, state, outcome);
        Ok(outcome)
    }

    /// Report a failure outside the engine, such as unreadable program text.
    ///
    /// Renders an error line, leaves batch mode, and takes a turn so an idle
    /// engine lands back at the interactive prompt.
    pub fn report_host_failure(&mut self, message: &str) -> DriverResult<TurnOutcome> {
        turnbasic_core::warn!(failure = message, "host failure");
        self.console.clear_prompt();
        self.console.println_classified(message, DiagnosticClass::Error);
        self.batch_loaded = false;
        self.interactive = true;
        self.take_turn()
    }

    // --- Accessors ---

    /// The console being driven.
    #[must_use]
    pub fn console(&self) -> &ConsoleModel {
        &self.console
    }

    /// Mutable console access for editing and screen clearing.
    pub fn console_mut(&mut self) -> &mut ConsoleModel {
        &mut self.console
    }

    /// The wrapped engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable engine access.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Seed the engine was given at construction.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether a program was supplied through [`Driver::load_program`].
    #[must_use]
    pub fn is_batch_loaded(&self) -> bool {
        self.batch_loaded
    }

    /// Whether finishing a program always returns to a prompt.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Number of turns taken so far.
    #[must_use]
    pub fn turn_count(&self) -> u64 {
        self.turns
    }

    // --- Rendering ---

    fn drain_output(&mut self) {
        for event in self.engine.take_latest_output() {
            self.render_event(&event);
        }
    }

    fn render_event(&mut self, event: &OutputEvent) {
        match event.kind.line_break() {
            LineBreak::Verbatim => self.console.print(&event.text),
            LineBreak::SpaceJoined => {
                let text = format!("{} ", event.text);
                self.console.print_classified(&text, DiagnosticClass::Info);
            }
            LineBreak::Terminated => {
                self.console.println_classified(&event.text, DiagnosticClass::Warning);
            }
        }
    }

    /// Render errors until the engine leaves `Errored`.
    fn settle_errors(&mut self) -> DriverResult<()> {
        while self.engine.state() == ExecutionState::Errored {
            let message = self
                .engine
                .take_latest_error()
                .ok_or_else(|| self.fault(DriverFault::MissingError))?;
            if message.trim().is_empty() {
                return Err(self.fault(DriverFault::EmptyError));
            }
            turnbasic_core::info!(error = %message, "engine error");

            let mut lines = message.lines();
            if let Some(first) = lines.next() {
                self.console.println_classified(first, DiagnosticClass::Error);
            }
            for context in lines {
                self.console.println_classified(
                    &format!("| {context}"),
                    DiagnosticClass::ErrorContext,
                );
            }
            self.drain_output();
        }
        Ok(())
    }

    fn settle_idle(&mut self) -> TurnOutcome {
        if self.batch_loaded && !self.interactive {
            self.console.disable_input();
            TurnOutcome::Idle {
                input_enabled: false,
            }
        } else {
            self.console.set_prompt(self.config.idle_prompt.clone());
            TurnOutcome::Idle {
                input_enabled: true,
            }
        }
    }

    fn fault(&self, fault: DriverFault) -> DriverFault {
        turnbasic_core::warn!(%fault, state = %self.engine.state(), "driver fault");
        fault
    }
}

fn wall_clock_seed() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
