#[cfg(test)]
#[path = "../../tests/unit/population/store_test.rs"]
mod store_test;

use crate::population::{
    compare_records, BucketKey, FeatureSpace, Island, IslandId, Metrics, ProgramId, ProgramRecord,
};
use crate::selection::SelectionPolicy;
use crate::utils::{compare_floats, EvolutionError, Float, Random};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Write};

/// A request to add a new candidate program to the population.
#[derive(Clone, Debug)]
pub struct NewProgram {
    /// The candidate program artifact.
    pub code: String,
    /// Identifiers of the parents this candidate was derived from, empty for seeds.
    pub parent_ids: Vec<ProgramId>,
    /// Evaluation metrics, `None` for a still pending candidate.
    pub metrics: Option<Metrics>,
    /// The destination island.
    pub island_id: IslandId,
}

/// A scope of a `best` query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BestScope {
    /// The best record across all islands.
    Global,
    /// The best record within one island's grid.
    Island(IslandId),
}

/// An outcome of an insert operation.
#[derive(Clone, Debug)]
pub struct InsertOutcome {
    /// Identifier assigned to the inserted record.
    pub id: ProgramId,
    /// True when the record became its bucket's elite.
    pub accepted: bool,
    /// The bucket the record was mapped to.
    pub bucket: BucketKey,
    /// The previous elite displaced by this record, if any.
    pub superseded: Option<ProgramId>,
}

/// Owns all retained program records and the islands partitioning them. The store is the
/// single synchronization point of a run: all mutations go through `&mut self`, so the
/// bucket compare-and-replace is trivially atomic and a query always observes a consistent
/// island state.
pub struct PopulationStore {
    arena: FxHashMap<ProgramId, ProgramRecord>,
    islands: Vec<Island>,
    feature_space: FeatureSpace,
    primary_metric: String,
    retain_rejected: bool,
    next_id: u64,
    global_best: Option<ProgramId>,
}

impl PopulationStore {
    /// Creates an empty store with a given amount of islands.
    pub fn new(
        num_islands: usize,
        feature_space: FeatureSpace,
        primary_metric: String,
        retain_rejected: bool,
    ) -> Self {
        assert!(num_islands > 0);
        Self {
            arena: FxHashMap::default(),
            islands: (0..num_islands).map(|idx| Island::new(IslandId(idx))).collect(),
            feature_space,
            primary_metric,
            retain_rejected,
            next_id: 0,
            global_best: None,
        }
    }

    /// Returns the name of the primary metric used for all fitness comparisons.
    pub fn primary_metric(&self) -> &str {
        &self.primary_metric
    }

    /// Returns the feature space used for diversity bucketing.
    pub fn feature_space(&self) -> &FeatureSpace {
        &self.feature_space
    }

    /// Returns amount of islands.
    pub fn num_islands(&self) -> usize {
        self.islands.len()
    }

    /// Returns an island by its id.
    pub fn island(&self, island_id: IslandId) -> Result<&Island, EvolutionError> {
        self.islands.get(island_id.0).ok_or(EvolutionError::IslandNotFound(island_id))
    }

    /// Gets a record from the arena.
    pub fn get(&self, id: ProgramId) -> Option<&ProgramRecord> {
        self.arena.get(&id)
    }

    /// Iterates over all retained records.
    pub fn records(&self) -> impl Iterator<Item = &ProgramRecord> + '_ {
        self.arena.values()
    }

    /// Returns amount of retained records.
    pub fn size(&self) -> usize {
        self.arena.len()
    }

    /// Adds a new program to the population. A scored record becomes its bucket's elite when
    /// the bucket is empty or when its primary metric strictly exceeds the current occupant's;
    /// a displaced elite stays in the arena for lineage bookkeeping, but leaves the live grid.
    /// A rejected, pending or non-finitely scored record never touches the grid and is
    /// retained only when the store is configured to keep non-elites.
    pub fn insert(&mut self, new: NewProgram) -> Result<InsertOutcome, EvolutionError> {
        self.island(new.island_id)?;

        let generation = self.lineage_generation(&new.parent_ids)?;
        let signature = self
            .feature_space
            .signature(&new.code, new.metrics.as_ref().unwrap_or(&Metrics::default()));

        let record = ProgramRecord {
            id: self.allocate_id(),
            code: new.code,
            parent_ids: new.parent_ids,
            metrics: new.metrics,
            feature_signature: signature,
            generation,
            island_id: new.island_id,
        };

        Ok(self.insert_record(record))
    }

    /// Copies an existing record into another island under the normal insert comparison rule.
    /// The copy gets a fresh id and the destination island id, but shares the source's code,
    /// metrics, signature and lineage; the source record is left untouched.
    pub fn insert_migrant(
        &mut self,
        source_id: ProgramId,
        island_id: IslandId,
    ) -> Result<InsertOutcome, EvolutionError> {
        self.island(island_id)?;
        let source = self.arena.get(&source_id).ok_or(EvolutionError::ProgramNotFound(source_id))?;

        let record = ProgramRecord {
            id: ProgramId(self.next_id),
            code: source.code.clone(),
            parent_ids: source.parent_ids.clone(),
            metrics: source.metrics.clone(),
            feature_signature: source.feature_signature.clone(),
            generation: source.generation,
            island_id,
        };
        self.next_id += 1;

        Ok(self.insert_record(record))
    }

    /// Selects `k` parent ids from an island's scored elites through the given policy.
    pub fn sample_parents(
        &self,
        island_id: IslandId,
        k: usize,
        policy: &dyn SelectionPolicy,
        random: &dyn Random,
    ) -> Result<Vec<ProgramId>, EvolutionError> {
        policy.select(self, island_id, k, random)
    }

    /// Returns the current best scored record in the given scope. Ties are broken by lower
    /// generation, then by earlier insertion.
    pub fn best(&self, scope: BestScope) -> Result<&ProgramRecord, EvolutionError> {
        let best_id = match scope {
            BestScope::Global => self.global_best,
            BestScope::Island(island_id) => self.island(island_id)?.best(),
        };

        best_id.and_then(|id| self.arena.get(&id)).ok_or(EvolutionError::Empty)
    }

    /// Returns all scored elite records of an island.
    pub fn elite_records(&self, island_id: IslandId) -> Result<Vec<&ProgramRecord>, EvolutionError> {
        let island = self.island(island_id)?;

        Ok(island.elites().filter_map(|id| self.arena.get(&id)).collect())
    }

    /// Returns ids of the island's top elites ordered best-first.
    pub fn top_elites(&self, island_id: IslandId, n: usize) -> Result<Vec<ProgramId>, EvolutionError> {
        let mut elites = self.elite_records(island_id)?;
        elites.sort_by(|a, b| compare_records(a, b, &self.primary_metric));

        Ok(elites.into_iter().take(n).map(|record| record.id).collect())
    }

    fn insert_record(&mut self, record: ProgramRecord) -> InsertOutcome {
        let bucket = self.feature_space.bucket_of(&record.feature_signature);
        let id = record.id;

        let island_idx = record.island_id.0;

        let fitness = record.fitness(&self.primary_metric);
        let is_improvement = match (fitness, self.islands[island_idx].occupant(&bucket)) {
            // pending or non-finite fitness never enters the grid: a NaN/infinite elite
            // could not be displaced by any later finite score
            (None, _) => false,
            (Some(fitness), _) if !fitness.is_finite() => false,
            (Some(_), None) => true,
            (Some(new_fitness), Some(occupant_id)) => {
                // strict improvement only: equal fitness keeps the earlier discovery
                let occupant = &self.arena[&occupant_id];
                let old_fitness = occupant.fitness(&self.primary_metric).unwrap_or(Float::NEG_INFINITY);
                compare_floats(new_fitness, old_fitness) == Ordering::Greater
            }
        };

        if !is_improvement {
            if self.retain_rejected {
                self.arena.insert(id, record);
            }
            return InsertOutcome { id, accepted: false, bucket, superseded: None };
        }

        self.arena.insert(id, record);
        let superseded = self.islands[island_idx].place_elite(bucket.clone(), id);
        self.update_best(id);

        InsertOutcome { id, accepted: true, bucket, superseded }
    }

    fn update_best(&mut self, id: ProgramId) {
        let record = &self.arena[&id];
        let island_idx = record.island_id.0;

        let is_island_best = match self.islands[island_idx].best().and_then(|best| self.arena.get(&best)) {
            Some(best) => compare_records(record, best, &self.primary_metric) == Ordering::Less,
            None => true,
        };
        if is_island_best {
            self.islands[island_idx].set_best(id);
        }

        let is_global_best = match self.global_best.and_then(|best| self.arena.get(&best)) {
            Some(best) => compare_records(record, best, &self.primary_metric) == Ordering::Less,
            None => true,
        };
        if is_global_best {
            self.global_best = Some(id);
        }
    }

    fn allocate_id(&mut self) -> ProgramId {
        let id = ProgramId(self.next_id);
        self.next_id += 1;
        id
    }

    fn lineage_generation(&self, parent_ids: &[ProgramId]) -> Result<usize, EvolutionError> {
        parent_ids.iter().try_fold(0, |acc: usize, parent_id| {
            self.arena
                .get(parent_id)
                .map(|parent| acc.max(parent.generation + 1))
                .ok_or(EvolutionError::ProgramNotFound(*parent_id))
        })
    }

    pub(crate) fn from_parts(
        arena: FxHashMap<ProgramId, ProgramRecord>,
        islands: Vec<Island>,
        next_id: u64,
        global_best: Option<ProgramId>,
        feature_space: FeatureSpace,
        primary_metric: String,
        retain_rejected: bool,
    ) -> Self {
        Self { arena, islands, feature_space, primary_metric, retain_rejected, next_id, global_best }
    }

    pub(crate) fn islands(&self) -> &[Island] {
        &self.islands
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.next_id
    }

    pub(crate) fn global_best_id(&self) -> Option<ProgramId> {
        self.global_best
    }
}

impl Display for PopulationStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let islands = self.islands.iter().fold(String::new(), |mut res, island| {
            let best = island
                .best()
                .and_then(|id| self.arena.get(&id))
                .and_then(|record| record.fitness(&self.primary_metric))
                .map(|fitness| format!("{fitness:.7}"))
                .unwrap_or_else(|| "-".to_string());
            write!(&mut res, "[{}: {} elites, best {}],", island.id(), island.size(), best).unwrap();

            res
        });

        write!(f, "{islands}")
    }
}
