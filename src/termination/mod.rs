//! The termination module contains logic which defines termination criteria for an
//! evolution run, e.g. when the generation controller should stop issuing attempts.

use crate::evolution::RunState;
use crate::utils::{compare_floats_refs, Float};

/// A trait which specifies criteria when the generation controller should stop searching.
pub trait Termination: Send + Sync {
    /// Returns true if termination condition is met.
    fn is_termination(&self, run_state: &RunState) -> bool;

    /// Returns a relative estimation till termination. Value is in the `[0, 1]` range.
    fn estimate(&self, run_state: &RunState) -> Float;
}

mod max_generation;
pub use self::max_generation::MaxGeneration;

mod max_time;
pub use self::max_time::MaxTime;

mod no_improvement;
pub use self::no_improvement::NoImprovement;

/// A termination criteria which encapsulates multiple criteria.
pub struct CompositeTermination {
    terminations: Vec<Box<dyn Termination>>,
}

impl CompositeTermination {
    /// Creates a new instance of `CompositeTermination`.
    pub fn new(terminations: Vec<Box<dyn Termination>>) -> Self {
        Self { terminations }
    }
}

impl Termination for CompositeTermination {
    fn is_termination(&self, run_state: &RunState) -> bool {
        self.terminations.iter().any(|t| t.is_termination(run_state))
    }

    fn estimate(&self, run_state: &RunState) -> Float {
        self.terminations.iter().map(|t| t.estimate(run_state)).max_by(compare_floats_refs).unwrap_or(0.)
    }
}
