pub mod background;
pub mod memory;

use std::time::Duration;

use thiserror::Error;

use crate::session::exercise::ExerciseMode;

pub use background::{BackgroundSink, SinkWorker};
pub use memory::MemoryStats;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("statistics worker is no longer running")]
    Disconnected,
    #[error("failed to record statistics: {0}")]
    Backend(String),
}

/// Where attempt records go. Callers treat every call as best-effort.
pub trait StatisticsSink {
    fn record_symbol_attempt(
        &mut self,
        symbol: char,
        is_correct: bool,
        elapsed: Duration,
    ) -> Result<(), StatsError>;

    fn record_exercise_attempt(
        &mut self,
        mode: ExerciseMode,
        is_correct: bool,
        elapsed: Duration,
    ) -> Result<(), StatsError>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum StatRecord {
    Symbol {
        symbol: char,
        is_correct: bool,
        elapsed: Duration,
    },
    Exercise {
        mode: ExerciseMode,
        is_correct: bool,
        elapsed: Duration,
    },
}

impl StatRecord {
    pub fn apply(self, sink: &mut dyn StatisticsSink) -> Result<(), StatsError> {
        match self {
            StatRecord::Symbol {
                symbol,
                is_correct,
                elapsed,
            } => sink.record_symbol_attempt(symbol, is_correct, elapsed),
            StatRecord::Exercise {
                mode,
                is_correct,
                elapsed,
            } => sink.record_exercise_attempt(mode, is_correct, elapsed),
        }
    }
}
