#[cfg(test)]
#[path = "../../tests/unit/evolution/controller_test.rs"]
mod controller_test;

use crate::checkpoint::Snapshot;
use crate::evolution::{EvolutionConfig, EvolutionConfigBuilder, RunReport, RunState, SeedProgram, Telemetry};
use crate::operators::{EvaluationError, Evaluator, Sampler, SamplerError, SamplingContext};
use crate::population::{BestScope, IslandId, Metrics, NewProgram, PopulationStore, ProgramId, ProgramRecord};
use crate::utils::{parallel_into_collect, EvolutionError, Float};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A lifecycle phase of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// The controller is created but the run has not started yet.
    Init,
    /// The attempt loop is active.
    Running,
    /// The controller drained in-flight attempts and is writing a snapshot.
    Checkpointing,
    /// The run finished after exhausting its budgets.
    Completed,
    /// The run was aborted by an unrecoverable error.
    Failed,
}

/// An outcome of one generation attempt, reported by a worker task.
struct AttemptOutcome {
    island_id: IslandId,
    parent_ids: Vec<ProgramId>,
    result: Result<(String, Metrics), AttemptFailure>,
}

enum AttemptFailure {
    Sampler(SamplerError),
    Evaluation(EvaluationError),
}

impl Display for AttemptFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptFailure::Sampler(error) => error.fmt(f),
            AttemptFailure::Evaluation(error) => error.fmt(f),
        }
    }
}

/// The generation controller: owns the population store and drives the attempt loop which
/// ties parent selection, external sampling and evaluation together with migration,
/// checkpointing and failure isolation.
///
/// Attempts execute concurrently up to the environment's parallelism bound, but the
/// controller is the single writer of the store: an attempt either fully applies its
/// insert or applies nothing, and concurrent completions are linearized here.
pub struct OpenEvolve {
    config: EvolutionConfig,
    store: PopulationStore,
    state: RunState,
    telemetry: Telemetry,
    status: RunStatus,
    last_checkpoint_generation: Option<usize>,
}

impl OpenEvolve {
    /// Creates a new controller, restoring the population from the latest checkpoint when
    /// the configuration asks for a resume, otherwise starting empty.
    pub fn new(config: EvolutionConfig) -> Result<Self, EvolutionError> {
        let telemetry = Telemetry::new(config.telemetry_mode.clone());

        let restored = match &config.checkpointing {
            Some(checkpointing) if checkpointing.resume => match checkpointing.storage.latest()? {
                Some(id) => {
                    let snapshot = checkpointing.storage.load(id)?;
                    let (store, counters) = snapshot.restore(
                        config.feature_space.clone(),
                        config.primary_metric.clone(),
                        config.retain_rejected,
                    )?;
                    telemetry.log(&format!("resumed from checkpoint {id} at generation {}", counters.generation));

                    Some((store, RunState::from_counters(counters)))
                }
                None => None,
            },
            _ => None,
        };

        let (store, state) = restored.unwrap_or_else(|| {
            let store = PopulationStore::new(
                config.num_islands,
                config.feature_space.clone(),
                config.primary_metric.clone(),
                config.retain_rejected,
            );

            (store, RunState::default())
        });

        Ok(Self { config, store, state, telemetry, status: RunStatus::Init, last_checkpoint_generation: None })
    }

    /// Returns the current lifecycle phase.
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Returns the population store.
    pub fn store(&self) -> &PopulationStore {
        &self.store
    }

    /// Returns the current run progress.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Runs evolution until a budget is exhausted or the environment quota cancels the run,
    /// then reports the best known record and summary statistics. Individual sampler or
    /// evaluator failures never abort the run.
    pub fn run(&mut self) -> Result<RunReport, EvolutionError> {
        let result = self.run_inner();
        if result.is_err() {
            self.status = RunStatus::Failed;
        }

        result
    }

    fn run_inner(&mut self) -> Result<RunReport, EvolutionError> {
        self.status = RunStatus::Running;

        if self.store.size() == 0 {
            self.seed_population()?;
        }
        self.telemetry.on_initial(&self.store);

        // NOTE sampler/evaluator calls block worker threads, hence one thread per attempt slot
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.environment.parallelism.max(1))
            .build()?;

        runtime.block_on(self.evolution_loop())?;

        // skip the final save when a periodic one already captured this generation
        if self.config.checkpointing.is_some() && self.last_checkpoint_generation != Some(self.state.generation) {
            self.save_checkpoint()?;
        }

        self.telemetry.on_result(&self.state, &self.store);

        let best = self.store.best(BestScope::Global)?.clone();
        self.status = RunStatus::Completed;

        Ok(RunReport {
            best,
            generations: self.state.generation,
            attempts_issued: self.state.attempts_issued,
            attempts_succeeded: self.state.attempts_succeeded,
            attempts_failed: self.state.attempts_failed,
            duration_secs: self.state.time.elapsed_secs_as_float(),
        })
    }

    /// Scores the configured seeds (unscored ones go through the evaluator in parallel) and
    /// replicates every scored seed into each island.
    fn seed_population(&mut self) -> Result<(), EvolutionError> {
        if self.config.seeds.is_empty() {
            return Err(EvolutionError::InvalidConfig("at least one seed program has to be specified".to_string()));
        }

        let evaluator = self.config.evaluator.clone();
        let seeds = std::mem::take(&mut self.config.seeds);

        let scored = parallel_into_collect(seeds, |seed| match seed.metrics {
            Some(metrics) => (seed.code, Ok(metrics)),
            None => {
                let result = evaluator.evaluate(&seed.code);
                (seed.code, result)
            }
        });

        let mut has_scored_seed = false;
        for (code, result) in scored {
            match result {
                Ok(metrics) => {
                    has_scored_seed = true;
                    for island_idx in 0..self.store.num_islands() {
                        self.store.insert(NewProgram {
                            code: code.clone(),
                            parent_ids: Vec::default(),
                            metrics: Some(metrics.clone()),
                            island_id: IslandId(island_idx),
                        })?;
                    }
                }
                Err(error) => self.telemetry.log(&format!("seed evaluation failed: {error}")),
            }
        }

        if !has_scored_seed {
            return Err(EvolutionError::InvalidConfig("no seed program could be scored".to_string()));
        }

        Ok(())
    }

    async fn evolution_loop(&mut self) -> Result<(), EvolutionError> {
        let parallelism = self.config.environment.parallelism.max(1);
        let (sender, mut receiver) = mpsc::channel::<AttemptOutcome>(parallelism);
        let mut in_flight = 0_usize;

        loop {
            let is_terminated = self.config.termination.is_termination(&self.state);
            let is_quota_reached = self.config.environment.quota.as_ref().map_or(false, |quota| quota.is_reached());

            if is_terminated || is_quota_reached {
                break;
            }

            while in_flight < parallelism {
                self.issue_attempt(sender.clone())?;
                in_flight += 1;
            }

            let outcome = receiver.recv().await.expect("attempt channel closed unexpectedly");
            in_flight -= 1;
            self.on_attempt_complete(outcome)?;

            if self.config.migration.is_due(self.state.generation) {
                let migrated = self.config.migration.migrate(&mut self.store)?;
                if !migrated.is_empty() {
                    self.telemetry.log(&format!("migrated {} elites between islands", migrated.len()));
                }
            }

            if self.is_checkpoint_due() {
                self.drain(&mut receiver, &mut in_flight).await?;
                self.save_checkpoint()?;
            }
        }

        // budget exhausted or cancelled: in-flight attempts complete and apply fully
        self.drain(&mut receiver, &mut in_flight).await?;

        Ok(())
    }

    fn issue_attempt(&mut self, sender: mpsc::Sender<AttemptOutcome>) -> Result<(), EvolutionError> {
        let island_id = IslandId(self.state.attempts_issued % self.store.num_islands());

        let parent_ids = self.store.sample_parents(
            island_id,
            self.config.parents_per_attempt,
            self.config.selection.as_ref(),
            self.config.environment.random.as_ref(),
        )?;
        let parents = parent_ids.iter().filter_map(|id| self.store.get(*id).cloned()).collect::<Vec<_>>();

        let context = SamplingContext {
            generation: self.state.generation,
            best_fitness: self.best_fitness(),
        };

        let sampler = self.config.sampler.clone();
        let evaluator = self.config.evaluator.clone();
        let retries = self.config.sampler_retries;

        self.state.attempts_issued += 1;

        tokio::spawn(async move {
            let result = execute_attempt(sampler.as_ref(), evaluator.as_ref(), &parents, &context, retries);
            let _ = sender.send(AttemptOutcome { island_id, parent_ids, result }).await;
        });

        Ok(())
    }

    fn on_attempt_complete(&mut self, outcome: AttemptOutcome) -> Result<(), EvolutionError> {
        self.state.generation += 1;

        match outcome.result {
            Ok((code, metrics)) => {
                let best_before = self.best_fitness();

                let insert = self.store.insert(NewProgram {
                    code,
                    parent_ids: outcome.parent_ids,
                    metrics: Some(metrics),
                    island_id: outcome.island_id,
                })?;
                self.state.attempts_succeeded += 1;

                let is_improved = insert.accepted
                    && match (best_before, self.best_fitness()) {
                        (Some(before), Some(after)) => after > before,
                        (None, Some(_)) => true,
                        _ => false,
                    };

                if is_improved {
                    self.state.generations_since_improvement = 0;
                } else {
                    self.state.generations_since_improvement += 1;
                }

                self.telemetry.on_generation(&self.state, &self.store, is_improved);
            }
            Err(failure) => {
                self.state.attempts_failed += 1;
                self.state.generations_since_improvement += 1;
                self.telemetry.on_attempt_failure(self.state.generation, &failure.to_string());
            }
        }

        Ok(())
    }

    async fn drain(
        &mut self,
        receiver: &mut mpsc::Receiver<AttemptOutcome>,
        in_flight: &mut usize,
    ) -> Result<(), EvolutionError> {
        while *in_flight > 0 {
            let outcome = receiver.recv().await.expect("attempt channel closed unexpectedly");
            *in_flight -= 1;
            self.on_attempt_complete(outcome)?;
        }

        Ok(())
    }

    fn is_checkpoint_due(&self) -> bool {
        self.config
            .checkpointing
            .as_ref()
            .and_then(|checkpointing| checkpointing.interval)
            .map_or(false, |interval| {
                interval > 0 && self.state.generation > 0 && self.state.generation % interval == 0
            })
    }

    fn save_checkpoint(&mut self) -> Result<(), EvolutionError> {
        let Some(checkpointing) = &self.config.checkpointing else {
            return Ok(());
        };

        self.status = RunStatus::Checkpointing;
        let snapshot = Snapshot::capture(&self.store, self.state.to_counters());
        let id = checkpointing.storage.save(&snapshot)?;
        self.telemetry.log(&format!("saved checkpoint {id} at generation {}", self.state.generation));
        self.last_checkpoint_generation = Some(self.state.generation);
        self.status = RunStatus::Running;

        Ok(())
    }

    fn best_fitness(&self) -> Option<Float> {
        self.store.best(BestScope::Global).ok().and_then(|record| record.fitness(self.store.primary_metric()))
    }
}

fn execute_attempt(
    sampler: &dyn Sampler,
    evaluator: &dyn Evaluator,
    parents: &[ProgramRecord],
    context: &SamplingContext,
    retries: usize,
) -> Result<(String, Metrics), AttemptFailure> {
    let mut last_error = None;

    for _ in 0..=retries {
        match sampler.propose(parents, context) {
            Ok(code) => {
                return evaluator.evaluate(&code).map(|metrics| (code, metrics)).map_err(AttemptFailure::Evaluation)
            }
            Err(error) => last_error = Some(error),
        }
    }

    Err(AttemptFailure::Sampler(last_error.expect("at least one sampler call is made")))
}

/// A convenience function which runs evolution with default configuration for given seeds,
/// sampler and evaluator.
pub fn run_evolution(
    seeds: Vec<SeedProgram>,
    sampler: Arc<dyn Sampler>,
    evaluator: Arc<dyn Evaluator>,
    max_generations: Option<usize>,
) -> Result<RunReport, EvolutionError> {
    let config = EvolutionConfigBuilder::default()
        .with_seeds(seeds)
        .with_sampler(sampler)
        .with_evaluator(evaluator)
        .with_max_generations(max_generations)
        .build()?;

    let mut controller = OpenEvolve::new(config)?;

    controller.run()
}
