#[cfg(test)]
#[path = "../../tests/unit/termination/max_generation_test.rs"]
mod max_generation_test;

use super::*;

/// A termination criteria which is in terminated state when maximum amount of generations
/// is reached.
pub struct MaxGeneration {
    limit: usize,
}

impl MaxGeneration {
    /// Creates a new instance of `MaxGeneration`.
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl Termination for MaxGeneration {
    fn is_termination(&self, run_state: &RunState) -> bool {
        run_state.generation >= self.limit
    }

    fn estimate(&self, run_state: &RunState) -> Float {
        (run_state.generation as Float / self.limit as Float).min(1.)
    }
}
