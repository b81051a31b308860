use super::*;
use crate::helpers::*;
use crate::population::{BestScope, Metrics, NewProgram};
use std::path::PathBuf;

fn create_populated_store() -> PopulationStore {
    let mut store = create_metric_bucket_store(2, 10);

    let seed = insert_scored(&mut store, IslandId(0), "seed", 1., 0.);
    insert_scored(&mut store, IslandId(1), "seed", 1., 0.);
    store
        .insert(NewProgram {
            code: "child".to_string(),
            parent_ids: vec![seed.id],
            metrics: Some(Metrics::new([("score".to_string(), 3.), ("x".to_string(), 0.5)])),
            island_id: IslandId(0),
        })
        .unwrap();
    // a rejected record retained for lineage
    insert_scored(&mut store, IslandId(0), "rejected", 0.5, 0.);

    store
}

fn create_counters() -> RunCounters {
    RunCounters { generation: 7, attempts_issued: 10, attempts_succeeded: 7, attempts_failed: 3 }
}

fn restore(snapshot: Snapshot) -> Result<(PopulationStore, RunCounters), EvolutionError> {
    snapshot.restore(
        FeatureSpace::new(10, std::sync::Arc::new(|_: &str, metrics: &Metrics| vec![metrics.get("x").unwrap_or(0.)])),
        "score".to_string(),
        true,
    )
}

fn temp_directory(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("openevolve_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&path);

    path
}

#[test]
fn can_round_trip_snapshot() {
    let store = create_populated_store();
    let snapshot = Snapshot::capture(&store, create_counters());

    let (restored, counters) = restore(snapshot).unwrap();

    assert_eq!(counters, create_counters());
    assert_eq!(restored.size(), store.size());
    assert_eq!(restored.next_id(), store.next_id());
    assert_eq!(restored.best(BestScope::Global).unwrap(), store.best(BestScope::Global).unwrap());

    for island in store.islands() {
        let restored_island = restored.island(island.id()).unwrap();
        assert_eq!(restored_island.size(), island.size());

        for (bucket, id) in island.buckets() {
            assert_eq!(restored_island.occupant(bucket), Some(id));
        }
    }

    for record in store.records() {
        assert_eq!(restored.get(record.id), Some(record));
    }
}

#[test]
fn can_continue_id_allocation_after_restore() {
    let store = create_populated_store();
    let snapshot = Snapshot::capture(&store, create_counters());

    let (mut restored, _) = restore(snapshot).unwrap();
    let outcome = insert_scored(&mut restored, IslandId(1), "new", 9., 0.9);

    assert!(store.records().all(|record| record.id != outcome.id));
}

#[test]
fn can_save_and_load_checkpoints() {
    let directory = temp_directory("save_load");
    let storage = FileCheckpointing::new(&directory);

    assert_eq!(storage.latest().unwrap(), None);

    let store = create_populated_store();
    let first = storage.save(&Snapshot::capture(&store, RunCounters::default())).unwrap();
    let second = storage.save(&Snapshot::capture(&store, create_counters())).unwrap();

    assert!(second > first);
    assert_eq!(storage.latest().unwrap(), Some(second));
    assert_eq!(storage.load(second).unwrap().counters, create_counters());

    let _ = std::fs::remove_dir_all(&directory);
}

#[test]
fn can_reject_unparsable_checkpoint_without_affecting_others() {
    let directory = temp_directory("corrupt_file");
    let storage = FileCheckpointing::new(&directory);

    let store = create_populated_store();
    let good = storage.save(&Snapshot::capture(&store, create_counters())).unwrap();
    let bad = storage.save(&Snapshot::capture(&store, create_counters())).unwrap();
    std::fs::write(directory.join(format!("checkpoint_{bad}.json")), b"not json").unwrap();

    assert!(matches!(storage.load(bad).err(), Some(EvolutionError::CorruptCheckpoint(_))));
    // the sibling checkpoint is intact
    assert!(restore(storage.load(good).unwrap()).is_ok());

    let _ = std::fs::remove_dir_all(&directory);
}

#[test]
fn can_detect_structural_corruption() {
    let directory = temp_directory("corrupt_structure");
    let storage = FileCheckpointing::new(&directory);

    let store = create_populated_store();
    let id = storage.save(&Snapshot::capture(&store, create_counters())).unwrap();
    let path = directory.join(format!("checkpoint_{id}.json"));

    // claim the id counter is behind existing records
    let mut value: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    value["next_id"] = serde_json::json!(0);
    std::fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

    let result = restore(storage.load(id).unwrap());
    assert!(matches!(result.err(), Some(EvolutionError::CorruptCheckpoint(_))));

    let _ = std::fs::remove_dir_all(&directory);
}

#[test]
fn can_detect_foreign_island_ownership() {
    let directory = temp_directory("corrupt_ownership");
    let storage = FileCheckpointing::new(&directory);

    let store = create_populated_store();
    let id = storage.save(&Snapshot::capture(&store, create_counters())).unwrap();
    let path = directory.join(format!("checkpoint_{id}.json"));

    let mut value: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    for program in value["programs"].as_array_mut().unwrap() {
        program["island_id"] = serde_json::json!(1);
    }
    std::fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

    let result = restore(storage.load(id).unwrap());
    assert!(matches!(result.err(), Some(EvolutionError::CorruptCheckpoint(_))));

    let _ = std::fs::remove_dir_all(&directory);
}
