//! Contains functionality to run an evolution search: configuration, the generation
//! controller and run telemetry.

use crate::checkpoint::RunCounters;
use crate::population::{Metrics, ProgramRecord};
use crate::utils::{Float, Timer};

mod config;
pub use self::config::*;

mod controller;
pub use self::controller::*;

pub mod telemetry;
pub use self::telemetry::*;

/// An initial program supplied by the caller. A seed may carry pre-computed metrics; an
/// unscored seed is evaluated before becoming eligible as a parent.
#[derive(Clone, Debug)]
pub struct SeedProgram {
    /// The seed program artifact.
    pub code: String,
    /// Pre-computed metrics, if the caller already evaluated the seed.
    pub metrics: Option<Metrics>,
}

impl SeedProgram {
    /// Creates an unscored seed from code.
    pub fn new<S: Into<String>>(code: S) -> Self {
        Self { code: code.into(), metrics: None }
    }

    /// Creates a seed with pre-computed metrics.
    pub fn new_scored<S: Into<String>>(code: S, metrics: Metrics) -> Self {
        Self { code: code.into(), metrics: Some(metrics) }
    }
}

/// Tracks the search progress of a run; consumed by termination criteria and telemetry.
#[derive(Clone)]
pub struct RunState {
    /// Amount of completed generations (one generation per finished attempt).
    pub generation: usize,
    /// Amount of attempts issued so far.
    pub attempts_issued: usize,
    /// Amount of attempts which resulted in an insert.
    pub attempts_succeeded: usize,
    /// Amount of attempts abandoned due to sampler or evaluator failures.
    pub attempts_failed: usize,
    /// Amount of completed generations since the global best improved the last time.
    pub generations_since_improvement: usize,
    /// Elapsed time since the run started.
    pub time: Timer,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            generation: 0,
            attempts_issued: 0,
            attempts_succeeded: 0,
            attempts_failed: 0,
            generations_since_improvement: 0,
            time: Timer::start(),
        }
    }
}

impl RunState {
    pub(crate) fn to_counters(&self) -> RunCounters {
        RunCounters {
            generation: self.generation,
            attempts_issued: self.attempts_issued,
            attempts_succeeded: self.attempts_succeeded,
            attempts_failed: self.attempts_failed,
        }
    }

    pub(crate) fn from_counters(counters: RunCounters) -> Self {
        Self {
            generation: counters.generation,
            attempts_issued: counters.attempts_issued,
            attempts_succeeded: counters.attempts_succeeded,
            attempts_failed: counters.attempts_failed,
            generations_since_improvement: 0,
            time: Timer::start(),
        }
    }
}

/// A summary of a finished run, reported regardless of individual attempt failures.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// The best known record across all islands.
    pub best: ProgramRecord,
    /// Amount of completed generations.
    pub generations: usize,
    /// Amount of attempts issued.
    pub attempts_issued: usize,
    /// Amount of attempts which resulted in an insert.
    pub attempts_succeeded: usize,
    /// Amount of attempts abandoned due to sampler or evaluator failures.
    pub attempts_failed: usize,
    /// Run duration in seconds.
    pub duration_secs: Float,
}
