//! This module reimports commonly used types.

pub use crate::evolution::{
    EvolutionConfig, EvolutionConfigBuilder, OpenEvolve, RunReport, RunState, RunStatus, SeedProgram,
    Telemetry, TelemetryMode,
};

pub use crate::population::{
    BestScope, BucketKey, FeatureSpace, InsertOutcome, Island, IslandId, Metrics, NewProgram,
    PopulationStore, ProgramId, ProgramRecord,
};

pub use crate::checkpoint::{CheckpointId, CheckpointStorage, FileCheckpointing, Snapshot};
pub use crate::migration::{MigrationPolicy, MigrationTopology};
pub use crate::operators::{EvaluationError, Evaluator, Sampler, SamplerError, SamplingContext};
pub use crate::selection::{SelectionPolicy, WeightedSelection};
pub use crate::termination::{CompositeTermination, MaxGeneration, MaxTime, NoImprovement, Termination};

pub use crate::utils::compare_floats;
pub use crate::utils::DefaultRandom;
pub use crate::utils::Environment;
pub use crate::utils::EvolutionError;
pub use crate::utils::Float;
pub use crate::utils::InfoLogger;
pub use crate::utils::Quota;
pub use crate::utils::Random;
