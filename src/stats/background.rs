use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::warn;

use crate::session::exercise::ExerciseMode;
use crate::stats::{StatRecord, StatisticsSink, StatsError};

/// Forwards records to a worker thread that owns the real sink, so recording
/// never blocks the caller.
pub struct BackgroundSink {
    tx: mpsc::Sender<StatRecord>,
}

/// Handle to the worker. The worker stops once every [`BackgroundSink`] is
/// dropped; joining hands the inner sink back.
pub struct SinkWorker<S> {
    handle: JoinHandle<S>,
}

impl BackgroundSink {
    pub fn spawn<S>(mut inner: S) -> (Self, SinkWorker<S>)
    where
        S: StatisticsSink + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<StatRecord>();
        let handle = thread::spawn(move || {
            for record in rx {
                if let Err(err) = record.apply(&mut inner) {
                    warn!(%err, "dropping statistics record");
                }
            }
            inner
        });
        (Self { tx }, SinkWorker { handle })
    }

    fn send(&self, record: StatRecord) -> Result<(), StatsError> {
        self.tx.send(record).map_err(|_| StatsError::Disconnected)
    }
}

impl StatisticsSink for BackgroundSink {
    fn record_symbol_attempt(
        &mut self,
        symbol: char,
        is_correct: bool,
        elapsed: Duration,
    ) -> Result<(), StatsError> {
        self.send(StatRecord::Symbol {
            symbol,
            is_correct,
            elapsed,
        })
    }

    fn record_exercise_attempt(
        &mut self,
        mode: ExerciseMode,
        is_correct: bool,
        elapsed: Duration,
    ) -> Result<(), StatsError> {
        self.send(StatRecord::Exercise {
            mode,
            is_correct,
            elapsed,
        })
    }
}

impl<S> SinkWorker<S> {
    /// Waits for queued records to drain. `None` if the worker panicked.
    pub fn join(self) -> Option<S> {
        self.handle.join().ok()
    }
}
