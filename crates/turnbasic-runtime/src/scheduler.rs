#![forbid(unsafe_code)]

//! Host-advanced turn scheduling.
//!
//! [`TurnScheduler`] holds a deterministic monotonic clock and at most one
//! pending deadline. It never sleeps: time only moves when the host calls
//! [`TurnScheduler::advance`] or [`TurnScheduler::set_time`], which keeps
//! scheduling reproducible under test and usable from a browser event loop.

use core::time::Duration;

use crate::driver::TurnOutcome;

/// Deterministic clock plus an optional next-turn deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnScheduler {
    now: Duration,
    deadline: Option<Duration>,
}

impl TurnScheduler {
    /// Create a scheduler at time zero with nothing pending.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            deadline: None,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Advance time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Set the current time.
    pub fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    /// Schedule the next turn from an outcome. Only a running program needs
    /// another turn; any other outcome clears the deadline.
    pub fn arm(&mut self, outcome: &TurnOutcome) {
        self.deadline = outcome
            .reschedule_after()
            .map(|delay| self.now.saturating_add(delay));
    }

    /// Drop the pending deadline.
    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    /// Whether a turn is pending and its deadline has passed.
    #[must_use]
    pub fn is_due(&self) -> bool {
        self.deadline.is_some_and(|deadline| self.now >= deadline)
    }

    /// Pending deadline, if any.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Time left until the pending turn is due. Zero when already due.
    #[must_use]
    pub fn time_until_due(&self) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_sub(self.now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RUNNING: TurnOutcome = TurnOutcome::Running {
        resume_after: Duration::from_millis(5),
    };

    #[test]
    fn idle_scheduler_is_never_due() {
        let mut sched = TurnScheduler::new();
        sched.advance(Duration::from_secs(60));
        assert!(!sched.is_due());
        assert_eq!(sched.next_deadline(), None);
    }

    #[test]
    fn running_outcome_arms_deadline() {
        let mut sched = TurnScheduler::new();
        sched.set_time(Duration::from_millis(10));
        sched.arm(&RUNNING);
        assert_eq!(sched.next_deadline(), Some(Duration::from_millis(15)));
        assert!(!sched.is_due());

        sched.advance(Duration::from_millis(4));
        assert!(!sched.is_due());
        assert_eq!(sched.time_until_due(), Some(Duration::from_millis(1)));

        sched.advance(Duration::from_millis(1));
        assert!(sched.is_due());
        assert_eq!(sched.time_until_due(), Some(Duration::ZERO));
    }

    #[test]
    fn suspended_outcomes_clear_deadline() {
        let mut sched = TurnScheduler::new();
        sched.arm(&RUNNING);
        sched.arm(&TurnOutcome::AwaitingInput);
        assert_eq!(sched.next_deadline(), None);

        sched.arm(&RUNNING);
        sched.arm(&TurnOutcome::Idle {
            input_enabled: true,
        });
        assert!(!sched.is_due());

        sched.arm(&RUNNING);
        sched.disarm();
        assert_eq!(sched.next_deadline(), None);
    }

    proptest! {
        #[test]
        fn never_due_before_deadline(start in 0u64..1_000, delay in 1u64..100, step in 0u64..200) {
            let mut sched = TurnScheduler::new();
            sched.set_time(Duration::from_millis(start));
            sched.arm(&TurnOutcome::Running { resume_after: Duration::from_millis(delay) });
            sched.advance(Duration::from_millis(step));
            prop_assert_eq!(sched.is_due(), step >= delay);
        }
    }
}
