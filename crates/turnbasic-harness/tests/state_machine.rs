#![forbid(unsafe_code)]

//! Property tests over random interaction sequences.

use proptest::prelude::*;
use turnbasic_core::ExecutionState;
use turnbasic_harness::SessionSimulator;
use turnbasic_runtime::{DriverFault, TurnOutcome};

#[derive(Debug, Clone)]
enum Action {
    Type(String),
    Break,
    Step,
}

fn command() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("RUN".to_string()),
        Just("LIST".to_string()),
        Just("PRINT 1+2".to_string()),
        Just("PRINT \"A\";".to_string()),
        Just("INPUT N".to_string()),
        Just("FROB".to_string()),
        Just("GOTO 10".to_string()),
        Just("7".to_string()),
        Just("10 GOTO 10".to_string()),
        Just("10 PRINT \"X\"".to_string()),
        Just("20 INPUT A$".to_string()),
        "[0-9]{1,3}",
    ]
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => command().prop_map(Action::Type),
        1 => Just(Action::Break),
        2 => Just(Action::Step),
    ]
}

fn consistent(outcome: TurnOutcome, state: ExecutionState) -> bool {
    match outcome {
        TurnOutcome::Idle { .. } => state == ExecutionState::Idle,
        TurnOutcome::AwaitingInput => state == ExecutionState::AwaitingInput,
        // The engine may already have moved on after its step.
        TurnOutcome::Running { resume_after } => !resume_after.is_zero(),
    }
}

proptest! {
    #[test]
    fn sessions_never_rest_in_errored(actions in proptest::collection::vec(action(), 1..40)) {
        let mut sim = SessionSimulator::new().with_max_turns(20);
        for action in actions {
            let before = sim.console().lines().to_vec();
            let result = match action {
                Action::Type(text) => sim.type_line(&text).map(Some),
                Action::Break => sim.press_break(),
                Action::Step => sim.step(),
            };
            let state = sim.session().state();
            match result {
                Ok(Some(outcome)) => {
                    prop_assert!(consistent(outcome, state), "{outcome:?} vs {state}");
                }
                Ok(None) => {}
                Err(fault) => {
                    prop_assert!(
                        matches!(
                            fault,
                            DriverFault::InvalidState { .. } | DriverFault::InputDisabled
                        ),
                        "{fault}"
                    );
                    prop_assert_eq!(sim.console().lines(), before.as_slice());
                }
            }
            prop_assert_ne!(state, ExecutionState::Errored);
        }
    }

    #[test]
    fn statement_lines_only_reach_the_engine(
        lines in proptest::collection::vec("[ A-Z0-9]{0,12}", 0..12)
    ) {
        let mut sim = SessionSimulator::new().with_max_turns(50);
        let text = lines.join("\n");
        sim.load(&text).unwrap();
        let numbered: Vec<u64> = lines
            .iter()
            .filter_map(|l| {
                let t = l.trim_start();
                let end = t.find(|c: char| !c.is_ascii_digit()).unwrap_or(t.len());
                (end > 0 && !t[end..].trim().is_empty()).then(|| t[..end].parse().ok()).flatten()
            })
            .collect();
        for number in sim.engine().program().keys() {
            prop_assert!(numbered.contains(number));
        }
    }
}
