#![forbid(unsafe_code)]

//! Host-facing session.
//!
//! [`Session`] bundles a [`Driver`], an [`InputHistory`] and a
//! [`TurnScheduler`] behind the handful of operations a UI needs:
//!
//! 1. Route typing into [`Session::console_mut`]'s edit buffer.
//! 2. Call [`Session::submit_line`] on Enter, [`Session::request_break`] on
//!    Ctrl-C and [`Session::navigate_history`] on Up/Down.
//! 3. Advance time with [`Session::advance_time`] and call
//!    [`Session::poll`] from the event loop. `poll` only takes a turn when
//!    one is due.
//! 4. Render [`Session::console`] after each call.
//!
//! A running turn can leave the engine `Errored` until the next poll renders
//! the error. [`Session::request_break`] settles such an error itself. A
//! submission in that window is refused with
//! [`DriverFault::InvalidState`](crate::DriverFault::InvalidState); hosts
//! that want to avoid the fault check [`Session::state`] first or poll.

use core::time::Duration;

use turnbasic_console::{ConsoleModel, HistoryDirection, InputHistory};
use turnbasic_core::{Engine, ExecutionState};

use crate::config::SessionConfig;
use crate::driver::{Driver, TurnOutcome};
use crate::error::DriverResult;
use crate::scheduler::TurnScheduler;

/// One interactive BASIC session.
#[derive(Debug)]
pub struct Session<E> {
    driver: Driver<E>,
    history: InputHistory,
    scheduler: TurnScheduler,
}

impl<E: Engine> Session<E> {
    /// Create a session around `engine`.
    pub fn new(engine: E, config: SessionConfig) -> Self {
        let mut history = InputHistory::new();
        if let Some(limit) = config.history_limit {
            history = history.with_max_entries(limit);
        }
        Self {
            driver: Driver::new(engine, config.driver),
            history,
            scheduler: TurnScheduler::new(),
        }
    }

    // --- Operations ---

    /// Load and run a whole program. See [`Driver::load_program`].
    pub fn load_program(&mut self, text: &str) -> DriverResult<TurnOutcome> {
        let outcome = self.driver.load_program(text)?;
        self.scheduler.arm(&outcome);
        Ok(outcome)
    }

    /// Report that program text from `source` could not be read.
    pub fn report_load_failure(&mut self, source: &str, reason: &str) -> DriverResult<TurnOutcome> {
        let outcome = self
            .driver
            .report_host_failure(&format!("ERROR READING {source}: {reason}"))?;
        self.scheduler.arm(&outcome);
        Ok(outcome)
    }

    /// Submit the edit buffer.
    ///
    /// The prompt and typed text are echoed as one committed line. Commands
    /// typed at the idle prompt are recorded in history; `INPUT` responses
    /// are not.
    pub fn submit_line(&mut self) -> DriverResult<TurnOutcome> {
        self.driver.check_submit()?;
        let text = self.driver.console_mut().edit_buffer_mut().take();
        self.submit(&text)
    }

    /// Submit `text` as if it had been typed.
    pub fn submit(&mut self, text: &str) -> DriverResult<TurnOutcome> {
        let state = self.driver.check_submit()?;
        self.driver.console_mut().commit_prompt_to_output(text);
        if state == ExecutionState::Idle {
            self.history.record_submission(text);
        }
        let outcome = self.driver.submit(text)?;
        self.scheduler.arm(&outcome);
        Ok(outcome)
    }

    /// Interrupt the running program. `Ok(None)` when nothing was running.
    ///
    /// An error still waiting to be rendered is settled with an early turn
    /// first. If that leaves nothing to interrupt, the settling turn's
    /// outcome is returned.
    pub fn request_break(&mut self) -> DriverResult<Option<TurnOutcome>> {
        let mut settled = None;
        if self.driver.state() == ExecutionState::Errored {
            let outcome = self.driver.take_turn()?;
            self.scheduler.arm(&outcome);
            settled = Some(outcome);
        }
        let outcome = self.driver.break_execution()?.or(settled);
        if let Some(outcome) = &outcome {
            self.driver.console_mut().edit_buffer_mut().clear();
            self.scheduler.arm(outcome);
        }
        Ok(outcome)
    }

    /// Recall an older or newer history entry into the edit buffer.
    pub fn navigate_history(&mut self, direction: HistoryDirection) -> bool {
        self.history.record_keystroke(direction, self.driver.console_mut().edit_buffer_mut())
    }

    /// Clear the screen. History is kept.
    pub fn clear_screen(&mut self) {
        self.driver.console_mut().clear_screen();
    }

    // --- Scheduling ---

    /// Advance the session clock.
    pub fn advance_time(&mut self, dt: Duration) {
        self.scheduler.advance(dt);
    }

    /// Set the session clock.
    pub fn set_time(&mut self, now: Duration) {
        self.scheduler.set_time(now);
    }

    /// Take a turn if one is due.
    pub fn poll(&mut self) -> DriverResult<Option<TurnOutcome>> {
        if !self.scheduler.is_due() {
            return Ok(None);
        }
        let outcome = self.driver.take_turn()?;
        self.scheduler.arm(&outcome);
        Ok(Some(outcome))
    }

    // --- Accessors ---

    /// Current engine state.
    #[must_use]
    pub fn state(&self) -> ExecutionState {
        self.driver.state()
    }

    /// Console to render.
    #[must_use]
    pub fn console(&self) -> &ConsoleModel {
        self.driver.console()
    }

    /// Mutable console access, mainly for the edit buffer.
    pub fn console_mut(&mut self) -> &mut ConsoleModel {
        self.driver.console_mut()
    }

    /// Submission history.
    #[must_use]
    pub fn history(&self) -> &InputHistory {
        &self.history
    }

    /// Turn scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    /// The underlying driver.
    #[must_use]
    pub fn driver(&self) -> &Driver<E> {
        &self.driver
    }

    /// Mutable driver access.
    pub fn driver_mut(&mut self) -> &mut Driver<E> {
        &mut self.driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriverConfig;
    use pretty_assertions::assert_eq;
    use turnbasic_core::OutputEvent;

    /// `LOOP` runs until broken, `CRASH` fails on its first step, `ASK`
    /// waits for input, anything else is printed back.
    #[derive(Debug, Default)]
    struct Loop {
        state: ExecutionState,
        output: Vec<OutputEvent>,
        error: Option<String>,
        crash: bool,
        steps: usize,
    }

    impl Engine for Loop {
        fn state(&self) -> ExecutionState {
            self.state
        }

        fn start_evaluating(&mut self, line: &str) {
            match line {
                "LOOP" => self.state = ExecutionState::Running,
                "CRASH" => {
                    self.crash = true;
                    self.state = ExecutionState::Running;
                }
                "ASK" => self.state = ExecutionState::AwaitingInput,
                other => self.output.push(OutputEvent::print(format!("{other}\n"))),
            }
        }

        fn continue_evaluating(&mut self) {
            self.steps += 1;
            if self.crash {
                self.crash = false;
                self.error = Some("?BOOM".to_string());
                self.state = ExecutionState::Errored;
            }
        }

        fn provide_input(&mut self, value: &str) {
            self.output.push(OutputEvent::print(format!("GOT {value}\n")));
            self.state = ExecutionState::Idle;
        }

        fn break_at_current_location(&mut self) {
            self.output.push(OutputEvent::break_at(None));
            self.state = ExecutionState::Idle;
        }

        fn take_latest_output(&mut self) -> Vec<OutputEvent> {
            std::mem::take(&mut self.output)
        }

        fn take_latest_error(&mut self) -> Option<String> {
            if self.state == ExecutionState::Errored {
                self.state = ExecutionState::Idle;
            }
            self.error.take()
        }

        fn seed_randomness(&mut self, _seed: u64) {}
    }

    fn session() -> Session<Loop> {
        let config = SessionConfig::default()
            .with_driver(DriverConfig::default().with_seed(1))
            .with_history_limit(5);
        Session::new(Loop::default(), config)
    }

    #[test]
    fn submit_line_echoes_and_records_idle_commands() {
        let mut s = session();
        s.console_mut().edit_buffer_mut().insert_str("HELLO");
        let outcome = s.submit_line().unwrap();

        assert_eq!(outcome, TurnOutcome::Idle { input_enabled: true });
        assert_eq!(s.console().line_texts(), vec!["] HELLO", "HELLO"]);
        assert!(s.console().edit_buffer().is_empty());
        assert_eq!(s.history().entries(), &["HELLO"]);
    }

    #[test]
    fn input_responses_skip_history() {
        let mut s = session();
        assert_eq!(s.submit("ASK").unwrap(), TurnOutcome::AwaitingInput);
        s.submit("42").unwrap();
        assert_eq!(s.history().entries(), &["ASK"]);
        assert_eq!(s.console().line_texts(), vec!["] ASK", "? 42", "GOT 42"]);
    }

    #[test]
    fn poll_only_runs_when_due() {
        let mut s = session();
        assert!(s.submit("LOOP").unwrap().is_running());
        assert_eq!(s.poll(), Ok(None));

        s.advance_time(Duration::from_millis(1));
        assert!(s.poll().unwrap().is_some_and(|o| o.is_running()));
        assert_eq!(s.driver().engine().steps, 2);
        assert_eq!(s.poll(), Ok(None));
    }

    #[test]
    fn break_clears_edit_buffer_and_disarms() {
        let mut s = session();
        s.submit("LOOP").unwrap();
        s.console_mut().edit_buffer_mut().insert_str("typed");

        let outcome = s.request_break().unwrap();
        assert_eq!(outcome, Some(TurnOutcome::Idle { input_enabled: true }));
        assert!(s.console().edit_buffer().is_empty());
        assert_eq!(s.scheduler().next_deadline(), None);
        assert_eq!(s.request_break(), Ok(None));
    }

    #[test]
    fn break_settles_an_error_left_by_a_running_turn() {
        let mut s = session();
        assert!(s.submit("CRASH").unwrap().is_running());
        assert_eq!(s.state(), ExecutionState::Errored);

        let outcome = s.request_break().unwrap();
        assert_eq!(outcome, Some(TurnOutcome::Idle { input_enabled: true }));
        assert_eq!(s.state(), ExecutionState::Idle);
        assert_eq!(s.console().line_texts(), vec!["] CRASH", "?BOOM"]);
        assert_eq!(s.console().prompt(), "] ");
        assert_eq!(s.scheduler().next_deadline(), None);
    }

    #[test]
    fn rejected_submit_leaves_buffer_alone() {
        let mut s = session();
        s.submit("LOOP").unwrap();
        s.console_mut().edit_buffer_mut().insert_str("PRINT");
        assert!(s.submit_line().is_err());
        assert_eq!(s.console().edit_buffer().value(), "PRINT");
        assert_eq!(s.history().entries(), &["LOOP"]);
    }
}
