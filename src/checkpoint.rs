//! Checkpointing captures a consistent snapshot of the population store and controller
//! progress so that a run can resume after shutdown or failure.

#[cfg(test)]
#[path = "../tests/unit/checkpoint_test.rs"]
mod checkpoint_test;

use crate::population::{
    BucketKey, FeatureSpace, Island, IslandId, PopulationStore, ProgramId, ProgramRecord,
};
use crate::utils::EvolutionError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// An identifier of a persisted checkpoint, monotonically increasing within a storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CheckpointId(pub u64);

impl Display for CheckpointId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Controller progress counters persisted alongside the population.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    /// Amount of completed generations.
    pub generation: usize,
    /// Amount of attempts issued.
    pub attempts_issued: usize,
    /// Amount of attempts which resulted in an insert.
    pub attempts_succeeded: usize,
    /// Amount of attempts abandoned due to sampler or evaluator failures.
    pub attempts_failed: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct IslandSnapshot {
    id: IslandId,
    grid: Vec<(BucketKey, ProgramId)>,
    best: Option<ProgramId>,
}

/// A serializable snapshot of the full population state: all retained records with lineage,
/// island grids and controller counters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    version: u32,
    programs: Vec<ProgramRecord>,
    islands: Vec<IslandSnapshot>,
    next_id: u64,
    global_best: Option<ProgramId>,
    /// Controller progress at capture time.
    pub counters: RunCounters,
}

const SNAPSHOT_VERSION: u32 = 1;

impl Snapshot {
    /// Captures a snapshot of the store and given controller counters. The caller must
    /// guarantee a quiescent point: no in-flight attempt may apply an insert concurrently.
    pub fn capture(store: &PopulationStore, counters: RunCounters) -> Self {
        let mut programs = store.records().cloned().collect::<Vec<_>>();
        programs.sort_by_key(|record| record.id);

        let islands = store
            .islands()
            .iter()
            .map(|island| IslandSnapshot {
                id: island.id(),
                grid: island.buckets().map(|(bucket, id)| (bucket.clone(), id)).collect(),
                best: island.best(),
            })
            .collect();

        Self {
            version: SNAPSHOT_VERSION,
            programs,
            islands,
            next_id: store.next_id(),
            global_best: store.global_best_id(),
            counters,
        }
    }

    /// Restores a population store, re-validating structural invariants. Fails with
    /// `CorruptCheckpoint` when the snapshot is inconsistent; the failure affects this
    /// snapshot only.
    pub fn restore(
        self,
        feature_space: FeatureSpace,
        primary_metric: String,
        retain_rejected: bool,
    ) -> Result<(PopulationStore, RunCounters), EvolutionError> {
        let corrupt = |msg: String| EvolutionError::CorruptCheckpoint(msg);

        if self.version != SNAPSHOT_VERSION {
            return Err(corrupt(format!("unsupported snapshot version: {}", self.version)));
        }

        let mut arena = FxHashMap::default();
        for record in self.programs {
            if record.id.0 >= self.next_id {
                return Err(corrupt(format!("record {} is beyond the id counter", record.id)));
            }
            if record.parent_ids.iter().any(|parent| *parent >= record.id) {
                return Err(corrupt(format!("record {} references a non-ancestor parent", record.id)));
            }
            if arena.insert(record.id, record).is_some() {
                return Err(corrupt("duplicate record id".to_string()));
            }
        }

        let mut islands = Vec::with_capacity(self.islands.len());
        for (idx, island_snapshot) in self.islands.into_iter().enumerate() {
            if island_snapshot.id.0 != idx {
                return Err(corrupt(format!("island {} is out of order", island_snapshot.id)));
            }

            let mut island = Island::new(island_snapshot.id);
            for (bucket, id) in island_snapshot.grid {
                let record: &ProgramRecord =
                    arena.get(&id).ok_or_else(|| corrupt(format!("grid references unknown record {id}")))?;
                if record.island_id != island_snapshot.id {
                    return Err(corrupt(format!("record {} is owned by another island", id)));
                }
                if record.is_pending() {
                    return Err(corrupt(format!("pending record {} occupies a bucket", id)));
                }
                if island.place_elite(bucket, id).is_some() {
                    return Err(corrupt("duplicate bucket occupancy".to_string()));
                }
            }

            if let Some(best) = island_snapshot.best {
                if !arena.contains_key(&best) {
                    return Err(corrupt(format!("island best {} is unknown", best)));
                }
                island.set_best(best);
            }

            islands.push(island);
        }

        if islands.is_empty() {
            return Err(corrupt("snapshot contains no islands".to_string()));
        }

        if let Some(best) = self.global_best {
            if !arena.contains_key(&best) {
                return Err(corrupt(format!("global best {} is unknown", best)));
            }
        }

        let store = PopulationStore::from_parts(
            arena,
            islands,
            self.next_id,
            self.global_best,
            feature_space,
            primary_metric,
            retain_rejected,
        );

        Ok((store, self.counters))
    }
}

/// An opaque persisted representation of snapshots keyed by checkpoint id.
pub trait CheckpointStorage: Send + Sync {
    /// Persists a snapshot and returns its id.
    fn save(&self, snapshot: &Snapshot) -> Result<CheckpointId, EvolutionError>;

    /// Loads a snapshot by its id.
    fn load(&self, id: CheckpointId) -> Result<Snapshot, EvolutionError>;

    /// Returns the most recent checkpoint id, if any checkpoint exists.
    fn latest(&self) -> Result<Option<CheckpointId>, EvolutionError>;
}

/// A file-backed checkpoint storage: each snapshot is one JSON file under a directory,
/// written to a temporary file first and atomically renamed, so a failed save never
/// corrupts earlier checkpoints.
pub struct FileCheckpointing {
    directory: PathBuf,
}

impl FileCheckpointing {
    /// Creates a storage writing under the given directory.
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self { directory: directory.into() }
    }

    fn path_of(&self, id: CheckpointId) -> PathBuf {
        self.directory.join(format!("checkpoint_{id}.json"))
    }
}

impl CheckpointStorage for FileCheckpointing {
    fn save(&self, snapshot: &Snapshot) -> Result<CheckpointId, EvolutionError> {
        std::fs::create_dir_all(&self.directory)?;

        let id = CheckpointId(self.latest()?.map_or(0, |latest| latest.0 + 1));
        let temp_path = self.directory.join(format!("checkpoint_{id}.json.tmp"));

        let data = serde_json::to_vec(snapshot)?;
        std::fs::write(&temp_path, data)?;
        std::fs::rename(&temp_path, self.path_of(id))?;

        Ok(id)
    }

    fn load(&self, id: CheckpointId) -> Result<Snapshot, EvolutionError> {
        let data = std::fs::read(self.path_of(id))?;

        serde_json::from_slice(&data)
            .map_err(|err| EvolutionError::CorruptCheckpoint(format!("cannot parse checkpoint {id}: {err}")))
    }

    fn latest(&self) -> Result<Option<CheckpointId>, EvolutionError> {
        if !self.directory.exists() {
            return Ok(None);
        }

        let mut latest = None;
        for entry in std::fs::read_dir(&self.directory)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();

            if let Some(id) = name
                .strip_prefix("checkpoint_")
                .and_then(|rest| rest.strip_suffix(".json"))
                .and_then(|id| id.parse::<u64>().ok())
            {
                latest = latest.max(Some(CheckpointId(id)));
            }
        }

        Ok(latest)
    }
}
