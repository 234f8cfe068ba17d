use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::exercise::ExerciseMode;
use crate::stats::{StatisticsSink, StatsError};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttemptTally {
    pub attempts: u32,
    pub correct: u32,
    pub total_time_ms: f64,
}

impl AttemptTally {
    fn record(&mut self, is_correct: bool, elapsed: Duration) {
        self.attempts += 1;
        if is_correct {
            self.correct += 1;
        }
        self.total_time_ms += elapsed.as_secs_f64() * 1000.0;
    }

    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.correct as f64 / self.attempts as f64 * 100.0
    }

    pub fn average_time_ms(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.total_time_ms / self.attempts as f64
    }
}

/// In-process tally of one run's attempts.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryStats {
    pub symbols: BTreeMap<char, AttemptTally>,
    pub modes: BTreeMap<ExerciseMode, AttemptTally>,
}

impl MemoryStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbol(&self, symbol: char) -> Option<&AttemptTally> {
        self.symbols.get(&symbol.to_ascii_uppercase())
    }

    pub fn mode(&self, mode: ExerciseMode) -> Option<&AttemptTally> {
        self.modes.get(&mode)
    }

    /// Symbols with the lowest accuracy first; ties go to the slower symbol.
    pub fn weakest_symbols(&self, limit: usize) -> Vec<char> {
        let mut ranked: Vec<(&char, &AttemptTally)> = self
            .symbols
            .iter()
            .filter(|(_, t)| t.correct < t.attempts)
            .collect();
        ranked.sort_by(|(_, a), (_, b)| {
            a.accuracy()
                .total_cmp(&b.accuracy())
                .then(b.average_time_ms().total_cmp(&a.average_time_ms()))
        });
        ranked.into_iter().take(limit).map(|(c, _)| *c).collect()
    }
}

impl StatisticsSink for MemoryStats {
    fn record_symbol_attempt(
        &mut self,
        symbol: char,
        is_correct: bool,
        elapsed: Duration,
    ) -> Result<(), StatsError> {
        self.symbols
            .entry(symbol.to_ascii_uppercase())
            .or_default()
            .record(is_correct, elapsed);
        Ok(())
    }

    fn record_exercise_attempt(
        &mut self,
        mode: ExerciseMode,
        is_correct: bool,
        elapsed: Duration,
    ) -> Result<(), StatsError> {
        self.modes.entry(mode).or_default().record(is_correct, elapsed);
        Ok(())
    }
}
