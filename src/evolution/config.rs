#[cfg(test)]
#[path = "../../tests/unit/evolution/config_test.rs"]
mod config_test;

use crate::checkpoint::CheckpointStorage;
use crate::evolution::{SeedProgram, TelemetryMode};
use crate::migration::{MigrationPolicy, MigrationTopology};
use crate::operators::{Evaluator, Sampler};
use crate::population::{default_feature_extractor, FeatureExtractor, FeatureSpace};
use crate::selection::{SelectionPolicy, WeightedSelection};
use crate::termination::{CompositeTermination, MaxGeneration, MaxTime, NoImprovement, Termination};
use crate::utils::{Environment, EvolutionError, Float, InfoLogger};
use std::sync::Arc;

/// Controls how and where checkpoints are taken.
pub struct CheckpointConfig {
    /// A storage for persisted snapshots.
    pub storage: Arc<dyn CheckpointStorage>,
    /// How often a periodic checkpoint is taken, in completed generations; `None` saves
    /// only on termination.
    pub interval: Option<usize>,
    /// Whether to restore from the latest checkpoint on start.
    pub resume: bool,
}

/// A configuration which controls evolution execution.
pub struct EvolutionConfig {
    /// An environment shared by run components.
    pub environment: Arc<Environment>,
    /// An external sampler proposing candidate programs.
    pub sampler: Arc<dyn Sampler>,
    /// An external evaluation harness.
    pub evaluator: Arc<dyn Evaluator>,
    /// A parent selection policy.
    pub selection: Arc<dyn SelectionPolicy>,
    /// A migration policy applied between islands.
    pub migration: MigrationPolicy,
    /// A termination which defines when evolution should stop.
    pub termination: Box<dyn Termination>,
    /// An optional checkpointing setup.
    pub checkpointing: Option<CheckpointConfig>,
    /// Initial seed programs.
    pub seeds: Vec<SeedProgram>,
    /// Amount of islands in the population.
    pub num_islands: usize,
    /// Amount of parents selected per generation attempt.
    pub parents_per_attempt: usize,
    /// Amount of extra sampler calls before an attempt is abandoned.
    pub sampler_retries: usize,
    /// A feature space used for diversity bucketing.
    pub feature_space: FeatureSpace,
    /// A name of the primary fitness metric.
    pub primary_metric: String,
    /// Whether non-elite records are retained for lineage bookkeeping.
    pub retain_rejected: bool,
    /// A telemetry mode.
    pub telemetry_mode: TelemetryMode,
}

/// Provides configurable way to build evolution configuration using fluent interface style.
pub struct EvolutionConfigBuilder {
    max_generations: Option<usize>,
    max_time: Option<usize>,
    min_improvement_window: Option<usize>,
    environment: Option<Arc<Environment>>,
    sampler: Option<Arc<dyn Sampler>>,
    evaluator: Option<Arc<dyn Evaluator>>,
    selection: Option<Arc<dyn SelectionPolicy>>,
    exploration_ratio: Float,
    novelty_weight: Float,
    migration_interval: usize,
    migration_top_n: usize,
    migration_topology: MigrationTopology,
    termination: Option<Box<dyn Termination>>,
    checkpointing: Option<CheckpointConfig>,
    seeds: Vec<SeedProgram>,
    num_islands: usize,
    parents_per_attempt: usize,
    sampler_retries: usize,
    feature_bins: usize,
    feature_extractor: Option<FeatureExtractor>,
    primary_metric: String,
    retain_rejected: bool,
    telemetry_mode: Option<TelemetryMode>,
}

impl Default for EvolutionConfigBuilder {
    fn default() -> Self {
        Self {
            max_generations: None,
            max_time: None,
            min_improvement_window: None,
            environment: None,
            sampler: None,
            evaluator: None,
            selection: None,
            exploration_ratio: 0.2,
            novelty_weight: 0.3,
            migration_interval: 25,
            migration_top_n: 1,
            migration_topology: MigrationTopology::Ring,
            termination: None,
            checkpointing: None,
            seeds: Vec::default(),
            num_islands: 4,
            parents_per_attempt: 1,
            sampler_retries: 2,
            feature_bins: 10,
            feature_extractor: None,
            primary_metric: "score".to_string(),
            retain_rejected: true,
            telemetry_mode: None,
        }
    }
}

impl EvolutionConfigBuilder {
    /// Sets max generations to be run by evolution. Default is 1000.
    pub fn with_max_generations(mut self, limit: Option<usize>) -> Self {
        self.max_generations = limit;
        self
    }

    /// Sets max running time limit in seconds for evolution. Default is no limit.
    pub fn with_max_time(mut self, limit: Option<usize>) -> Self {
        self.max_time = limit;
        self
    }

    /// Sets an early-stop window: the run stops when the best known fitness has not
    /// improved for the given amount of generations. Default is None.
    pub fn with_min_improvement_window(mut self, window: Option<usize>) -> Self {
        self.min_improvement_window = window;
        self
    }

    /// Sets an environment (randomness, parallelism, quota, logging).
    pub fn with_environment(mut self, environment: Arc<Environment>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Sets the external sampler.
    pub fn with_sampler(mut self, sampler: Arc<dyn Sampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Sets the external evaluator.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Sets a custom selection policy replacing the default weighted one.
    pub fn with_selection(mut self, selection: Arc<dyn SelectionPolicy>) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Sets exploration/novelty ratios used by the default selection policy.
    pub fn with_selection_ratios(mut self, exploration_ratio: Float, novelty_weight: Float) -> Self {
        self.exploration_ratio = exploration_ratio;
        self.novelty_weight = novelty_weight;
        self
    }

    /// Sets migration parameters: cadence in generations, amount of migrated elites and
    /// inter-island topology. Defaults are 25, 1 and ring.
    pub fn with_migration(mut self, interval: usize, top_n: usize, topology: MigrationTopology) -> Self {
        self.migration_interval = interval;
        self.migration_top_n = top_n;
        self.migration_topology = topology;
        self
    }

    /// Sets a custom termination replacing budget-derived criteria.
    pub fn with_termination(mut self, termination: Box<dyn Termination>) -> Self {
        self.termination = Some(termination);
        self
    }

    /// Enables checkpointing with the given storage, periodic cadence and resume behavior.
    pub fn with_checkpointing(
        mut self,
        storage: Arc<dyn CheckpointStorage>,
        interval: Option<usize>,
        resume: bool,
    ) -> Self {
        self.checkpointing = Some(CheckpointConfig { storage, interval, resume });
        self
    }

    /// Sets initial seed programs.
    pub fn with_seeds(mut self, seeds: Vec<SeedProgram>) -> Self {
        self.seeds = seeds;
        self
    }

    /// Sets amount of islands. Default is 4.
    pub fn with_islands(mut self, num_islands: usize) -> Self {
        self.num_islands = num_islands;
        self
    }

    /// Sets amount of parents per attempt. Default is 1 (mutation style prompting).
    pub fn with_parents_per_attempt(mut self, parents: usize) -> Self {
        self.parents_per_attempt = parents;
        self
    }

    /// Sets amount of extra sampler calls per attempt. Default is 2.
    pub fn with_sampler_retries(mut self, retries: usize) -> Self {
        self.sampler_retries = retries;
        self
    }

    /// Sets feature grid granularity and a custom feature extractor.
    pub fn with_features(mut self, bins: usize, extractor: Option<FeatureExtractor>) -> Self {
        self.feature_bins = bins;
        self.feature_extractor = extractor;
        self
    }

    /// Sets the primary fitness metric name. Default is `score`.
    pub fn with_primary_metric<S: Into<String>>(mut self, name: S) -> Self {
        self.primary_metric = name.into();
        self
    }

    /// Sets whether rejected (non-elite) records are retained for lineage/audit purposes.
    /// Default is true.
    pub fn with_retain_rejected(mut self, retain: bool) -> Self {
        self.retain_rejected = retain;
        self
    }

    /// Sets a telemetry mode.
    pub fn with_telemetry_mode(mut self, mode: TelemetryMode) -> Self {
        self.telemetry_mode = Some(mode);
        self
    }

    fn get_termination(
        logger: &InfoLogger,
        max_generations: Option<usize>,
        max_time: Option<usize>,
        min_improvement_window: Option<usize>,
    ) -> Box<dyn Termination> {
        let terminations: Vec<Box<dyn Termination>> = match (max_generations, max_time, min_improvement_window) {
            (None, None, None) => {
                (logger)("configured to use default max-generations (1000)");
                vec![Box::new(MaxGeneration::new(1000))]
            }
            _ => {
                let mut terminations: Vec<Box<dyn Termination>> = vec![];

                if let Some(limit) = max_generations {
                    (logger)(format!("configured to use max-generations: {limit}").as_str());
                    terminations.push(Box::new(MaxGeneration::new(limit)))
                }

                if let Some(limit) = max_time {
                    (logger)(format!("configured to use max-time: {limit}s").as_str());
                    terminations.push(Box::new(MaxTime::new(limit as Float)));
                }

                if let Some(window) = min_improvement_window {
                    (logger)(format!("configured to use no-improvement window: {window}").as_str());
                    terminations.push(Box::new(NoImprovement::new(window)));
                }

                terminations
            }
        };

        Box::new(CompositeTermination::new(terminations))
    }

    /// Builds the evolution config.
    pub fn build(self) -> Result<EvolutionConfig, EvolutionError> {
        let environment = self.environment.unwrap_or_default();
        let logger = environment.logger.clone();

        let sampler =
            self.sampler.ok_or_else(|| EvolutionError::InvalidConfig("missing sampler".to_string()))?;
        let evaluator =
            self.evaluator.ok_or_else(|| EvolutionError::InvalidConfig("missing evaluator".to_string()))?;

        if self.num_islands == 0 {
            return Err(EvolutionError::InvalidConfig("amount of islands must be positive".to_string()));
        }
        if self.parents_per_attempt == 0 {
            return Err(EvolutionError::InvalidConfig("amount of parents per attempt must be positive".to_string()));
        }
        if self.feature_bins == 0 {
            return Err(EvolutionError::InvalidConfig("amount of feature bins must be positive".to_string()));
        }

        let termination = match self.termination {
            Some(termination) => {
                (logger)("configured to use a custom termination");
                termination
            }
            None => Self::get_termination(&logger, self.max_generations, self.max_time, self.min_improvement_window),
        };

        let selection = match self.selection {
            Some(selection) => selection,
            None => {
                (logger)(
                    format!(
                        "configured to use weighted selection with exploration: {}, novelty: {}",
                        self.exploration_ratio, self.novelty_weight
                    )
                    .as_str(),
                );
                Arc::new(WeightedSelection::new(self.exploration_ratio, self.novelty_weight))
            }
        };

        let feature_space = FeatureSpace::new(
            self.feature_bins,
            self.feature_extractor.unwrap_or_else(default_feature_extractor),
        );

        let telemetry_mode = self.telemetry_mode.unwrap_or_else(|| TelemetryMode::OnlyLogging {
            logger: logger.clone(),
            log_best: 100,
            log_population: 1000,
        });

        Ok(EvolutionConfig {
            environment,
            sampler,
            evaluator,
            selection,
            migration: MigrationPolicy::new(self.migration_interval, self.migration_top_n, self.migration_topology),
            termination,
            checkpointing: self.checkpointing,
            seeds: self.seeds,
            num_islands: self.num_islands,
            parents_per_attempt: self.parents_per_attempt,
            sampler_retries: self.sampler_retries,
            feature_space,
            primary_metric: self.primary_metric,
            retain_rejected: self.retain_rejected,
            telemetry_mode,
        })
    }
}
