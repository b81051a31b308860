use crate::population::{BucketKey, IslandId, ProgramId};
use rustc_hash::FxHashMap;

/// An independently evolving sub-population which keeps at most one elite program per
/// feature bucket. The store owns the actual records; an island tracks occupancy only.
#[derive(Clone, Debug)]
pub struct Island {
    id: IslandId,
    grid: FxHashMap<BucketKey, ProgramId>,
    best: Option<ProgramId>,
}

impl Island {
    /// Creates an empty island.
    pub fn new(id: IslandId) -> Self {
        Self { id, grid: FxHashMap::default(), best: None }
    }

    /// Returns the island identifier.
    pub fn id(&self) -> IslandId {
        self.id
    }

    /// Returns the current elite of a bucket, if any.
    pub fn occupant(&self, bucket: &BucketKey) -> Option<ProgramId> {
        self.grid.get(bucket).copied()
    }

    /// Places a new elite into a bucket returning the displaced occupant, if any.
    pub(crate) fn place_elite(&mut self, bucket: BucketKey, id: ProgramId) -> Option<ProgramId> {
        self.grid.insert(bucket, id)
    }

    /// Returns the island's best record id, if any record is scored.
    pub fn best(&self) -> Option<ProgramId> {
        self.best
    }

    pub(crate) fn set_best(&mut self, id: ProgramId) {
        self.best = Some(id);
    }

    /// Iterates over all occupied buckets.
    pub fn buckets(&self) -> impl Iterator<Item = (&BucketKey, ProgramId)> + '_ {
        self.grid.iter().map(|(bucket, id)| (bucket, *id))
    }

    /// Iterates over all elite ids.
    pub fn elites(&self) -> impl Iterator<Item = ProgramId> + '_ {
        self.grid.values().copied()
    }

    /// Returns amount of occupied buckets.
    pub fn size(&self) -> usize {
        self.grid.len()
    }
}
