use super::*;
use crate::helpers::*;
use crate::population::single_metric;
use crate::selection::WeightedSelection;
use crate::utils::DefaultRandom;

#[test]
fn can_insert_into_empty_bucket() {
    let mut store = create_metric_bucket_store(1, 10);

    let outcome = insert_scored(&mut store, IslandId(0), "seed", 1., 0.);

    assert!(outcome.accepted);
    assert_eq!(outcome.superseded, None);
    assert_eq!(store.island(IslandId(0)).unwrap().size(), 1);
}

#[test]
fn can_supersede_elite_only_on_strict_improvement() {
    let mut store = create_metric_bucket_store(1, 10);

    let first = insert_scored(&mut store, IslandId(0), "a", 1., 0.);
    // same bucket, equal fitness: earlier discovery stays
    let equal = insert_scored(&mut store, IslandId(0), "b", 1., 0.);
    assert!(!equal.accepted);

    let worse = insert_scored(&mut store, IslandId(0), "c", 0.5, 0.);
    assert!(!worse.accepted);

    let better = insert_scored(&mut store, IslandId(0), "d", 2., 0.);
    assert!(better.accepted);
    assert_eq!(better.superseded, Some(first.id));

    assert_eq!(store.island(IslandId(0)).unwrap().size(), 1);
    assert_eq!(store.best(BestScope::Global).unwrap().id, better.id);
}

#[test]
fn can_keep_bucket_quality_monotonic() {
    let mut store = create_metric_bucket_store(1, 10);
    let scores = [1., 3., 2., 5., 4., 5.];
    let mut best_so_far = Float::NEG_INFINITY;

    for (idx, &score) in scores.iter().enumerate() {
        insert_scored(&mut store, IslandId(0), &format!("c{idx}"), score, 0.);
        best_so_far = best_so_far.max(score);

        let elite = store.elite_records(IslandId(0)).unwrap()[0].fitness("score").unwrap();
        assert_eq!(elite, best_so_far);
    }
}

#[test]
fn can_retain_rejected_records_for_lineage() {
    let mut store = create_metric_bucket_store(1, 10);

    insert_scored(&mut store, IslandId(0), "a", 2., 0.);
    let rejected = insert_scored(&mut store, IslandId(0), "b", 1., 0.);

    assert_eq!(store.size(), 2);
    assert!(store.get(rejected.id).is_some());
    assert_eq!(store.island(IslandId(0)).unwrap().size(), 1);
}

#[test]
fn can_discard_rejected_records_when_configured() {
    let mut store = PopulationStore::new(
        1,
        FeatureSpace::new(10, std::sync::Arc::new(|_: &str, _: &Metrics| vec![0.])),
        "score".to_string(),
        false,
    );

    store
        .insert(NewProgram {
            code: "a".to_string(),
            parent_ids: Vec::default(),
            metrics: Some(single_metric("score", 2.)),
            island_id: IslandId(0),
        })
        .unwrap();
    let rejected = store
        .insert(NewProgram {
            code: "b".to_string(),
            parent_ids: Vec::default(),
            metrics: Some(single_metric("score", 1.)),
            island_id: IslandId(0),
        })
        .unwrap();

    assert!(!rejected.accepted);
    assert_eq!(store.size(), 1);
    assert!(store.get(rejected.id).is_none());
}

#[test]
fn can_track_lineage_generation() {
    let mut store = create_metric_bucket_store(1, 10);

    let seed = insert_scored(&mut store, IslandId(0), "seed", 1., 0.);
    assert_eq!(store.get(seed.id).unwrap().generation, 0);

    let child = store
        .insert(NewProgram {
            code: "child".to_string(),
            parent_ids: vec![seed.id],
            metrics: Some(Metrics::new([("score".to_string(), 2.), ("x".to_string(), 0.5)])),
            island_id: IslandId(0),
        })
        .unwrap();
    assert_eq!(store.get(child.id).unwrap().generation, 1);
    assert_eq!(store.get(child.id).unwrap().parent_ids, vec![seed.id]);
}

#[test]
fn can_fail_on_unknown_parent() {
    let mut store = create_metric_bucket_store(1, 10);

    let result = store.insert(NewProgram {
        code: "child".to_string(),
        parent_ids: vec![ProgramId(42)],
        metrics: Some(single_metric("score", 1.)),
        island_id: IslandId(0),
    });

    assert_eq!(result.err(), Some(EvolutionError::ProgramNotFound(ProgramId(42))));
}

#[test]
fn can_fail_on_unknown_island() {
    let mut store = create_metric_bucket_store(2, 10);

    assert_eq!(
        insert_scored_result(&mut store, IslandId(5)).err(),
        Some(EvolutionError::IslandNotFound(IslandId(5)))
    );
    assert_eq!(store.best(BestScope::Island(IslandId(5))).err(), Some(EvolutionError::IslandNotFound(IslandId(5))));
}

fn insert_scored_result(store: &mut PopulationStore, island_id: IslandId) -> Result<InsertOutcome, EvolutionError> {
    store.insert(NewProgram {
        code: "a".to_string(),
        parent_ids: Vec::default(),
        metrics: Some(single_metric("score", 1.)),
        island_id,
    })
}

#[test]
fn can_fail_on_empty_best() {
    let store = create_metric_bucket_store(1, 10);

    assert_eq!(store.best(BestScope::Global).err(), Some(EvolutionError::Empty));
    assert_eq!(store.best(BestScope::Island(IslandId(0))).err(), Some(EvolutionError::Empty));
}

#[test]
fn can_break_best_ties_by_generation_then_insertion() {
    let mut store = create_metric_bucket_store(1, 10);

    let seed = insert_scored(&mut store, IslandId(0), "seed", 2., 0.);
    // same fitness at a deeper generation lands in another bucket
    store
        .insert(NewProgram {
            code: "child".to_string(),
            parent_ids: vec![seed.id],
            metrics: Some(Metrics::new([("score".to_string(), 2.), ("x".to_string(), 0.5)])),
            island_id: IslandId(0),
        })
        .unwrap();
    assert_eq!(store.best(BestScope::Global).unwrap().id, seed.id);

    // same fitness, same generation, later insertion in yet another bucket
    insert_scored(&mut store, IslandId(0), "late", 2., 0.9);
    assert_eq!(store.best(BestScope::Global).unwrap().id, seed.id);
}

#[test]
fn can_scope_best_per_island() {
    let mut store = create_metric_bucket_store(2, 10);

    insert_scored(&mut store, IslandId(0), "a", 1., 0.);
    let better = insert_scored(&mut store, IslandId(1), "b", 3., 0.);

    assert_eq!(store.best(BestScope::Island(IslandId(0))).unwrap().fitness("score"), Some(1.));
    assert_eq!(store.best(BestScope::Island(IslandId(1))).unwrap().id, better.id);
    assert_eq!(store.best(BestScope::Global).unwrap().id, better.id);
}

#[test]
fn can_reject_non_finite_primary_metrics() {
    let mut store = create_metric_bucket_store(1, 10);

    let nan = insert_scored(&mut store, IslandId(0), "nan", Float::NAN, 0.);
    assert!(!nan.accepted);
    assert_eq!(store.best(BestScope::Global).err(), Some(EvolutionError::Empty));

    let finite = insert_scored(&mut store, IslandId(0), "finite", 1., 0.);
    assert!(finite.accepted);

    let infinite = insert_scored(&mut store, IslandId(0), "infinite", Float::INFINITY, 0.);
    assert!(!infinite.accepted);
    assert_eq!(store.best(BestScope::Global).unwrap().id, finite.id);
    assert_eq!(store.island(IslandId(0)).unwrap().size(), 1);
}

#[test]
fn can_sample_parents_through_policy() {
    let mut store = create_metric_bucket_store(1, 10);
    let elite = insert_scored(&mut store, IslandId(0), "elite", 2., 0.);

    let parents = store
        .sample_parents(IslandId(0), 2, &WeightedSelection::default(), &DefaultRandom::new_repeatable(0))
        .unwrap();

    assert_eq!(parents, vec![elite.id, elite.id]);
}

#[test]
fn can_keep_global_best_across_supersession() {
    let mut store = create_metric_bucket_store(1, 10);

    insert_scored(&mut store, IslandId(0), "a", 1., 0.);
    let best = insert_scored(&mut store, IslandId(0), "b", 5., 0.);
    insert_scored(&mut store, IslandId(0), "c", 3., 0.5);

    assert_eq!(store.best(BestScope::Global).unwrap().id, best.id);

    let superseding = insert_scored(&mut store, IslandId(0), "d", 6., 0.);
    assert_eq!(store.best(BestScope::Global).unwrap().id, superseding.id);
    // the displaced best is still retrievable for lineage purposes
    assert!(store.get(best.id).is_some());
}
