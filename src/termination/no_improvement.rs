#[cfg(test)]
#[path = "../../tests/unit/termination/no_improvement_test.rs"]
mod no_improvement_test;

use super::*;

/// An early-stop criteria which is in terminated state when the best known fitness has not
/// improved for a given amount of completed generations.
pub struct NoImprovement {
    limit: usize,
}

impl NoImprovement {
    /// Creates a new instance of `NoImprovement`.
    pub fn new(limit: usize) -> Self {
        assert!(limit > 0);
        Self { limit }
    }
}

impl Termination for NoImprovement {
    fn is_termination(&self, run_state: &RunState) -> bool {
        run_state.generations_since_improvement >= self.limit
    }

    fn estimate(&self, run_state: &RunState) -> Float {
        (run_state.generations_since_improvement as Float / self.limit as Float).min(1.)
    }
}
