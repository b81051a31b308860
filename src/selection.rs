//! A selection policy chooses parent programs for the next generation attempt, balancing
//! exploitation of fitness against exploration of under-represented feature buckets.

#[cfg(test)]
#[path = "../tests/unit/selection_test.rs"]
mod selection_test;

use crate::population::{compare_records, IslandId, PopulationStore, ProgramId, ProgramRecord};
use crate::utils::{EvolutionError, Float, Random};

/// Selects `k` parents from an island. Implementations must be deterministic for a fixed
/// random seed, so runs and tests are reproducible.
pub trait SelectionPolicy: Send + Sync {
    /// Selects parent ids from the island's scored elites. Fails with `Empty` when the
    /// island has no scored record yet.
    fn select(
        &self,
        store: &PopulationStore,
        island_id: IslandId,
        k: usize,
        random: &dyn Random,
    ) -> Result<Vec<ProgramId>, EvolutionError>;
}

/// A weighted selection scheme: with probability `exploration_ratio` a parent is drawn
/// uniformly at random from the island's elites; otherwise elites are weighted by a mix of
/// fitness rank (geometric decay) and bucket novelty (elites in sparse grid neighborhoods
/// are preferred).
pub struct WeightedSelection {
    exploration_ratio: Float,
    novelty_weight: Float,
}

/// Controls how fast rank weights decay: the n-th best elite gets `RANK_DECAY^n`.
const RANK_DECAY: Float = 0.7;

impl WeightedSelection {
    /// Creates a weighted selection policy. Both ratios are expected in `[0, 1]`.
    pub fn new(exploration_ratio: Float, novelty_weight: Float) -> Self {
        Self { exploration_ratio: exploration_ratio.clamp(0., 1.), novelty_weight: novelty_weight.clamp(0., 1.) }
    }

    fn weights(&self, store: &PopulationStore, island_id: IslandId, elites: &[&ProgramRecord]) -> Vec<Float> {
        let novelties = elites
            .iter()
            .map(|record| {
                let bucket = store.feature_space().bucket_of(&record.feature_signature);
                let neighbors = store
                    .island(island_id)
                    .map(|island| {
                        island
                            .buckets()
                            .filter(|(other, _)| {
                                other.0.len() == bucket.0.len()
                                    && **other != bucket
                                    && other
                                        .0
                                        .iter()
                                        .zip(bucket.0.iter())
                                        .all(|(&a, &b)| a.abs_diff(b) <= 1)
                            })
                            .count()
                    })
                    .unwrap_or(0);

                1. / (1. + neighbors as Float)
            })
            .collect::<Vec<_>>();

        elites
            .iter()
            .enumerate()
            .map(|(rank, _)| {
                let rank_weight = RANK_DECAY.powi(rank as i32);
                (1. - self.novelty_weight) * rank_weight + self.novelty_weight * novelties[rank]
            })
            .collect()
    }
}

impl Default for WeightedSelection {
    fn default() -> Self {
        Self::new(0.2, 0.3)
    }
}

impl SelectionPolicy for WeightedSelection {
    fn select(
        &self,
        store: &PopulationStore,
        island_id: IslandId,
        k: usize,
        random: &dyn Random,
    ) -> Result<Vec<ProgramId>, EvolutionError> {
        let mut elites = store.elite_records(island_id)?;
        if elites.is_empty() {
            return Err(EvolutionError::Empty);
        }

        // stable best-first order keeps weighting independent of grid iteration order
        elites.sort_by(|a, b| compare_records(a, b, store.primary_metric()));

        let weights = self.weights(store, island_id, &elites);

        Ok((0..k)
            .map(|_| {
                let idx = if random.is_hit(self.exploration_ratio) {
                    random.uniform_int(0, elites.len() as i32 - 1) as usize
                } else {
                    random.weighted(&weights)
                };

                elites[idx].id
            })
            .collect())
    }
}
