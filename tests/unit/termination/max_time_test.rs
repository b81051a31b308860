use super::*;
use crate::evolution::RunState;
use std::time::Duration;

#[test]
fn can_detect_termination() {
    let run_state = RunState::default();

    assert!(!MaxTime::new(1E9).is_termination(&run_state));

    std::thread::sleep(Duration::from_millis(5));
    assert!(MaxTime::new(0.001).is_termination(&run_state));
}

#[test]
fn can_estimate_progress() {
    let run_state = RunState::default();

    let estimate = MaxTime::new(1E9).estimate(&run_state);
    assert!((0. ..0.5).contains(&estimate));

    std::thread::sleep(Duration::from_millis(5));
    assert_eq!(MaxTime::new(0.001).estimate(&run_state), 1.);
}
