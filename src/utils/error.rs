use crate::population::{IslandId, ProgramId};

/// An error type for fallible operations on the population store, the checkpointing layer
/// and the run controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvolutionError {
    /// An unknown island was referenced by a query or insert operation.
    IslandNotFound(IslandId),
    /// An unknown program was referenced.
    ProgramNotFound(ProgramId),
    /// No scored record exists yet to answer a `best` query.
    Empty,
    /// A checkpoint violates structural invariants and cannot be used for resume.
    CorruptCheckpoint(String),
    /// A configuration value combination makes the run impossible.
    InvalidConfig(String),
    /// An underlying io/serialization failure, e.g. while writing a checkpoint.
    Storage(String),
}

impl std::fmt::Display for EvolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvolutionError::IslandNotFound(id) => write!(f, "unknown island: {id}"),
            EvolutionError::ProgramNotFound(id) => write!(f, "unknown program: {id}"),
            EvolutionError::Empty => write!(f, "no scored program record is available"),
            EvolutionError::CorruptCheckpoint(msg) => write!(f, "corrupt checkpoint: {msg}"),
            EvolutionError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            EvolutionError::Storage(msg) => write!(f, "storage failure: {msg}"),
        }
    }
}

impl std::error::Error for EvolutionError {}

impl From<std::io::Error> for EvolutionError {
    fn from(value: std::io::Error) -> Self {
        EvolutionError::Storage(value.to_string())
    }
}

impl From<serde_json::Error> for EvolutionError {
    fn from(value: serde_json::Error) -> Self {
        EvolutionError::Storage(value.to_string())
    }
}
