//! A module which provides the logic to log essential information about run progress.

#[cfg(test)]
#[path = "../../tests/unit/evolution/telemetry_test.rs"]
mod telemetry_test;

use crate::evolution::RunState;
use crate::population::{BestScope, PopulationStore};
use crate::utils::InfoLogger;

/// Specifies a telemetry mode.
#[derive(Clone)]
pub enum TelemetryMode {
    /// No telemetry at all.
    None,
    /// Progress logging.
    OnlyLogging {
        /// A logger type.
        logger: InfoLogger,
        /// Specifies how often the best known record is logged, in generations.
        log_best: usize,
        /// Specifies how often the whole population state is logged, in generations.
        log_population: usize,
    },
}

/// Provides a way to write progress information into a log in the configured cadence.
pub struct Telemetry {
    mode: TelemetryMode,
}

impl Telemetry {
    /// Creates a new instance of `Telemetry`.
    pub fn new(mode: TelemetryMode) -> Self {
        Self { mode }
    }

    /// Logs an arbitrary message.
    pub fn log(&self, message: &str) {
        if let TelemetryMode::OnlyLogging { logger, .. } = &self.mode {
            (logger)(message);
        }
    }

    /// Called once when the population got its initial programs.
    pub fn on_initial(&self, store: &PopulationStore) {
        self.log(&format!("created initial population: {store}"));
    }

    /// Called after each completed generation.
    pub fn on_generation(&self, run_state: &RunState, store: &PopulationStore, is_improved: bool) {
        let TelemetryMode::OnlyLogging { log_best, log_population, .. } = &self.mode else {
            return;
        };

        let generation = run_state.generation;

        if is_improved || (*log_best > 0 && generation % *log_best == 0) {
            let best = store
                .best(BestScope::Global)
                .ok()
                .and_then(|record| record.fitness(store.primary_metric()))
                .map(|fitness| format!("{fitness:.7}"))
                .unwrap_or_else(|| "-".to_string());

            self.log(&format!(
                "generation {generation}: best {best}, attempts {}/{} ok/failed",
                run_state.attempts_succeeded, run_state.attempts_failed
            ));
        }

        if *log_population > 0 && generation % *log_population == 0 {
            self.log(&format!("population state: {store}"));
        }
    }

    /// Called when an attempt is abandoned due to an external failure.
    pub fn on_attempt_failure(&self, generation: usize, message: &str) {
        self.log(&format!("attempt at generation {generation} failed: {message}"));
    }

    /// Called once at the end of the run.
    pub fn on_result(&self, run_state: &RunState, store: &PopulationStore) {
        self.log(&format!(
            "run finished after {} generations in {}s: issued {}, succeeded {}, failed {}; population: {store}",
            run_state.generation,
            run_state.time.elapsed_secs(),
            run_state.attempts_issued,
            run_state.attempts_succeeded,
            run_state.attempts_failed,
        ));
    }
}
