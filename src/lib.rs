//! This crate implements the core of an automated evolutionary program search: a
//! quality-diversity population manager (islands with MAP-Elites style feature grids) and
//! a generation controller which iteratively selects parent programs, asks an external
//! sampler for a mutated variant, scores it through an external evaluation harness and
//! decides whether to admit the variant into the population. Checkpointing allows a run
//! to resume after shutdown or failure.
//!
//! Prompt construction, model protocols and execution sandboxes are the concern of the
//! [`operators::Sampler`] and [`operators::Evaluator`] implementations supplied by the
//! caller.

#![warn(missing_docs)]

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
pub mod helpers;

pub mod checkpoint;
pub mod evolution;
pub mod migration;
pub mod operators;
pub mod population;
pub mod prelude;
pub mod selection;
pub mod termination;
pub mod utils;

pub use crate::evolution::{run_evolution, OpenEvolve};
