//! External collaborator contracts: the language-model sampler which proposes candidate
//! programs and the evaluation harness which scores them. Both are treated as slow and
//! unreliable; any non-success is a transient, per-attempt failure for the controller.

use crate::population::{Metrics, ProgramRecord};
use crate::utils::Float;
use std::fmt::{Display, Formatter};

/// A transient sampler failure: the attempt is retried up to a configured limit and then
/// abandoned without affecting the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SamplerError(pub String);

impl Display for SamplerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "sampler failure: {}", self.0)
    }
}

impl std::error::Error for SamplerError {}

/// A transient evaluation failure covering execution crashes, timeouts and scoring errors
/// uniformly: the candidate is discarded without insertion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluationError(pub String);

impl Display for EvaluationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "evaluation failure: {}", self.0)
    }
}

impl std::error::Error for EvaluationError {}

/// Extra context passed to the sampler alongside parent records.
#[derive(Clone, Debug, Default)]
pub struct SamplingContext {
    /// Amount of completed generations so far.
    pub generation: usize,
    /// The best known primary fitness, if any candidate has been scored.
    pub best_fitness: Option<Float>,
}

/// An external sampler which proposes a mutated or rewritten program variant conditioned on
/// parent code and prior performance feedback.
pub trait Sampler: Send + Sync {
    /// Proposes candidate code derived from the given parents.
    fn propose(&self, parents: &[ProgramRecord], context: &SamplingContext) -> Result<String, SamplerError>;
}

/// An external evaluation harness which executes a candidate program and scores it. Must be
/// safe to invoke repeatedly and concurrently with independent candidates.
pub trait Evaluator: Send + Sync {
    /// Evaluates candidate code into a metrics mapping.
    fn evaluate(&self, candidate_code: &str) -> Result<Metrics, EvaluationError>;
}
