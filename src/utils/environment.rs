use crate::utils::{DefaultRandom, Random, Timer};
use std::sync::Arc;

/// Specifies a computational quota for an evolution run, an external hook which allows
/// the owner of the process to request a cooperative cancellation.
pub trait Quota: Send + Sync {
    /// Returns true when the quota is reached and the run should stop issuing new work.
    fn is_reached(&self) -> bool;
}

/// Specifies a logger type to be used by components to log useful information.
pub type InfoLogger = Arc<dyn Fn(&str) + Send + Sync>;

/// Keeps track of environment specific information which influences algorithm behavior.
#[derive(Clone)]
pub struct Environment {
    /// A wrapper on random generator.
    pub random: Arc<dyn Random>,

    /// An external request to cancel the run, checked between generation attempts.
    pub quota: Option<Arc<dyn Quota>>,

    /// Amount of generation attempts which can be in flight simultaneously.
    pub parallelism: usize,

    /// A logger type which is used to log internal state.
    pub logger: InfoLogger,
}

impl Environment {
    /// Creates an instance of `Environment`.
    pub fn new(
        random: Arc<dyn Random>,
        quota: Option<Arc<dyn Quota>>,
        parallelism: usize,
        logger: InfoLogger,
    ) -> Self {
        Self { random, quota, parallelism, logger }
    }

    /// Creates a repeatable environment with a fixed random seed and a given parallelism.
    pub fn new_with_seed(seed: u64, parallelism: usize) -> Self {
        Self {
            random: Arc::new(DefaultRandom::new_repeatable(seed)),
            quota: None,
            parallelism,
            logger: create_info_logger(),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(Arc::new(DefaultRandom::default()), None, num_cpus::get(), create_info_logger())
    }
}

fn create_info_logger() -> InfoLogger {
    let timer = Timer::start();
    Arc::new(move |msg: &str| println!("[{}s] {}", timer.elapsed_secs(), msg))
}
