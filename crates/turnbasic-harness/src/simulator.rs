#![forbid(unsafe_code)]

//! Deterministic session simulator.
//!
//! `SessionSimulator` wraps a [`Session`] around a [`ScriptEngine`] and plays
//! the host's part: it types into the edit buffer, presses Enter or Ctrl-C,
//! and jumps the session clock straight to each turn deadline instead of
//! waiting for it.
//!
//! # Example
//!
//! ```
//! use turnbasic_harness::SessionSimulator;
//!
//! let mut sim = SessionSimulator::new();
//! sim.type_line("PRINT \"HI\"").unwrap();
//! assert_eq!(sim.line_texts(), vec!["] PRINT \"HI\"", "HI"]);
//! assert_eq!(sim.console().prompt(), "] ");
//! ```

use turnbasic_console::{ConsoleModel, HistoryDirection};
use turnbasic_runtime::{DriverConfig, DriverResult, Session, SessionConfig, TurnOutcome};

use crate::script_engine::ScriptEngine;

/// Default cap on turns taken by [`SessionSimulator::run_until_suspended`].
pub const DEFAULT_MAX_TURNS: usize = 10_000;

/// Host stand-in for driving a [`Session`] in tests.
#[derive(Debug)]
pub struct SessionSimulator {
    session: Session<ScriptEngine>,
    max_turns: usize,
    outcomes: Vec<TurnOutcome>,
}

impl Default for SessionSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionSimulator {
    /// Simulator with a fixed seed and default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(
            SessionConfig::default().with_driver(DriverConfig::default().with_seed(0)),
        )
    }

    /// Simulator with explicit session settings.
    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        Self::with_engine(ScriptEngine::new(), config)
    }

    /// Simulator around a prepared engine.
    #[must_use]
    pub fn with_engine(engine: ScriptEngine, config: SessionConfig) -> Self {
        Self {
            session: Session::new(engine, config),
            max_turns: DEFAULT_MAX_TURNS,
            outcomes: Vec::new(),
        }
    }

    /// Cap the turns [`run_until_suspended`](Self::run_until_suspended) takes.
    #[must_use]
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    // --- Host actions ---

    /// Load a program and run it until it suspends.
    pub fn load(&mut self, text: &str) -> DriverResult<TurnOutcome> {
        let outcome = self.session.load_program(text)?;
        self.record(outcome);
        self.run_until_suspended()
    }

    /// Type `text` at the prompt, press Enter, and run until suspended.
    pub fn type_line(&mut self, text: &str) -> DriverResult<TurnOutcome> {
        self.session.console_mut().edit_buffer_mut().insert_str(text);
        let outcome = self.session.submit_line()?;
        self.record(outcome);
        self.run_until_suspended()
    }

    /// Press Ctrl-C.
    pub fn press_break(&mut self) -> DriverResult<Option<TurnOutcome>> {
        let outcome = self.session.request_break()?;
        if let Some(outcome) = outcome {
            self.record(outcome);
        }
        Ok(outcome)
    }

    /// Press Up or Down.
    pub fn press_history(&mut self, direction: HistoryDirection) -> bool {
        self.session.navigate_history(direction)
    }

    /// Jump to the pending deadline and take that turn.
    ///
    /// Returns `Ok(None)` when nothing is scheduled.
    pub fn step(&mut self) -> DriverResult<Option<TurnOutcome>> {
        let Some(deadline) = self.session.scheduler().next_deadline() else {
            return Ok(None);
        };
        self.session.set_time(deadline);
        let outcome = self.session.poll()?;
        if let Some(outcome) = outcome {
            self.record(outcome);
        }
        Ok(outcome)
    }

    /// Take up to `turns` scheduled turns. Returns how many were taken.
    pub fn run_turns(&mut self, turns: usize) -> DriverResult<usize> {
        for taken in 0..turns {
            if self.step()?.is_none() {
                return Ok(taken);
            }
        }
        Ok(turns)
    }

    /// Step until the session stops asking for turns or the turn cap is hit.
    pub fn run_until_suspended(&mut self) -> DriverResult<TurnOutcome> {
        let mut last = self.outcomes.last().copied().unwrap_or(TurnOutcome::Idle {
            input_enabled: self.console().is_input_enabled(),
        });
        for _ in 0..self.max_turns {
            match self.step()? {
                Some(outcome) => last = outcome,
                None => break,
            }
        }
        Ok(last)
    }

    // --- Inspection ---

    /// The simulated session.
    #[must_use]
    pub fn session(&self) -> &Session<ScriptEngine> {
        &self.session
    }

    /// Mutable session access.
    pub fn session_mut(&mut self) -> &mut Session<ScriptEngine> {
        &mut self.session
    }

    /// The session console.
    #[must_use]
    pub fn console(&self) -> &ConsoleModel {
        self.session.console()
    }

    /// The engine behind the session.
    #[must_use]
    pub fn engine(&self) -> &ScriptEngine {
        self.session.driver().engine()
    }

    /// Committed line texts.
    #[must_use]
    pub fn line_texts(&self) -> Vec<String> {
        self.console().line_texts()
    }

    /// Every outcome observed so far, oldest first.
    #[must_use]
    pub fn outcomes(&self) -> &[TurnOutcome] {
        &self.outcomes
    }

    fn record(&mut self, outcome: TurnOutcome) {
        self.outcomes.push(outcome);
    }
}
