//! A migration policy periodically copies top performers between islands to propagate
//! improvements without homogenizing sub-populations prematurely.

#[cfg(test)]
#[path = "../tests/unit/migration_test.rs"]
mod migration_test;

use crate::population::{InsertOutcome, IslandId, PopulationStore};
use crate::utils::EvolutionError;

/// Defines which islands receive migrants from a given source island.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrationTopology {
    /// Each island sends migrants to its successor only (wrap-around).
    Ring,
    /// Each island sends migrants to every other island.
    AllToAll,
}

/// A policy which runs every fixed number of generations and copies each island's top
/// elites into neighbor islands. Migration goes through the store's normal insert rule,
/// so it can never degrade a destination bucket and never removes a source record.
pub struct MigrationPolicy {
    interval: usize,
    top_n: usize,
    topology: MigrationTopology,
}

impl MigrationPolicy {
    /// Creates a migration policy. `interval` is measured in completed generations.
    pub fn new(interval: usize, top_n: usize, topology: MigrationTopology) -> Self {
        assert!(interval > 0);
        Self { interval, top_n, topology }
    }

    /// Checks whether migration is due at the given generation.
    pub fn is_due(&self, generation: usize) -> bool {
        generation > 0 && generation % self.interval == 0
    }

    /// Migrates top elites of every island to its neighbors, returning the outcomes of the
    /// accepted copies.
    pub fn migrate(&self, store: &mut PopulationStore) -> Result<Vec<InsertOutcome>, EvolutionError> {
        let num_islands = store.num_islands();
        if num_islands < 2 || self.top_n == 0 {
            return Ok(Vec::default());
        }

        let mut outcomes = Vec::new();

        for source in 0..num_islands {
            let elites = store.top_elites(IslandId(source), self.top_n)?;

            for destination in self.destinations(source, num_islands) {
                for &elite in elites.iter() {
                    let outcome = store.insert_migrant(elite, IslandId(destination))?;
                    if outcome.accepted {
                        outcomes.push(outcome);
                    }
                }
            }
        }

        Ok(outcomes)
    }

    fn destinations(&self, source: usize, num_islands: usize) -> Vec<usize> {
        match self.topology {
            MigrationTopology::Ring => vec![(source + 1) % num_islands],
            MigrationTopology::AllToAll => (0..num_islands).filter(|&idx| idx != source).collect(),
        }
    }
}

impl Default for MigrationPolicy {
    fn default() -> Self {
        Self::new(25, 1, MigrationTopology::Ring)
    }
}
