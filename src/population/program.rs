#[cfg(test)]
#[path = "../../tests/unit/population/program_test.rs"]
mod program_test;

use crate::utils::{compare_floats, Float};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A unique identifier of a program record. Identifiers are allocated from a monotonically
/// increasing counter, so they double as insertion order: a parent always has a smaller id
/// than any of its descendants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProgramId(pub u64);

impl Display for ProgramId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// An identifier of an island (an independently evolving sub-population).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IslandId(pub usize);

impl Display for IslandId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// A mapping from metric name to numeric score as produced by an external evaluator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    values: FxHashMap<String, Float>,
}

impl Metrics {
    /// Creates metrics from name/value pairs.
    pub fn new<I: IntoIterator<Item = (String, Float)>>(values: I) -> Self {
        Self { values: values.into_iter().collect() }
    }

    /// Gets a metric value by name.
    pub fn get(&self, name: &str) -> Option<Float> {
        self.values.get(name).copied()
    }

    /// Returns a primary fitness value: the metric stored under `primary` when present,
    /// otherwise the mean of all finite metric values. An empty mapping yields negative
    /// infinity so that any scored candidate outranks it.
    pub fn primary(&self, primary: &str) -> Float {
        if let Some(value) = self.get(primary) {
            return value;
        }

        let finite = self.values.values().copied().filter(|value| value.is_finite()).collect::<Vec<_>>();
        if finite.is_empty() {
            Float::NEG_INFINITY
        } else {
            finite.iter().sum::<Float>() / finite.len() as Float
        }
    }

    /// Iterates over all metric name/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Float)> + '_ {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Returns amount of stored metrics.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks whether no metric is stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A single metric shortcut used by convenience constructors and tests.
pub fn single_metric(name: &str, value: Float) -> Metrics {
    Metrics::new([(name.to_string(), value)])
}

/// Represents one candidate program: code, evaluation metrics, lineage and the derived
/// feature signature used for diversity bucketing. Once scored and inserted, a record
/// is never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgramRecord {
    /// A unique identifier assigned at creation.
    pub id: ProgramId,
    /// The candidate program artifact.
    pub code: String,
    /// Ordered ancestor identifiers, empty for seed programs. Forms a DAG: every parent id
    /// is strictly smaller than the record's own id.
    pub parent_ids: Vec<ProgramId>,
    /// Evaluation metrics; `None` marks a pending record which is not selectable as a parent.
    pub metrics: Option<Metrics>,
    /// A low-dimensional descriptor used to place the record into a diversity bucket.
    pub feature_signature: Vec<Float>,
    /// Lineage depth: `max(parent generations) + 1`, zero for seeds.
    pub generation: usize,
    /// The island which owns the record.
    pub island_id: IslandId,
}

impl ProgramRecord {
    /// Checks whether the record is still awaiting evaluation.
    pub fn is_pending(&self) -> bool {
        self.metrics.is_none()
    }

    /// Returns the primary fitness value or `None` for a pending record.
    pub fn fitness(&self, primary: &str) -> Option<Float> {
        self.metrics.as_ref().map(|metrics| metrics.primary(primary))
    }
}

/// Orders two scored records: higher primary metric first, ties broken by lower generation
/// (prefer earlier discovery), then by lower id (earlier insertion).
pub fn compare_records(a: &ProgramRecord, b: &ProgramRecord, primary: &str) -> std::cmp::Ordering {
    let a_fitness = a.fitness(primary).unwrap_or(Float::NEG_INFINITY);
    let b_fitness = b.fitness(primary).unwrap_or(Float::NEG_INFINITY);

    compare_floats(b_fitness, a_fitness)
        .then_with(|| a.generation.cmp(&b.generation))
        .then_with(|| a.id.cmp(&b.id))
}
