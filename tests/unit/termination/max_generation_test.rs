use super::*;
use crate::evolution::RunState;

fn create_run_state(generation: usize) -> RunState {
    RunState { generation, ..RunState::default() }
}

#[test]
fn can_detect_termination() {
    for (generation, limit, expected) in [(0, 10, false), (9, 10, false), (10, 10, true), (11, 10, true), (0, 0, true)]
    {
        let termination = MaxGeneration::new(limit);

        assert_eq!(termination.is_termination(&create_run_state(generation)), expected);
    }
}

#[test]
fn can_estimate_progress() {
    let termination = MaxGeneration::new(10);

    assert_eq!(termination.estimate(&create_run_state(0)), 0.);
    assert_eq!(termination.estimate(&create_run_state(5)), 0.5);
    assert_eq!(termination.estimate(&create_run_state(20)), 1.);
}
