//! Single-symbol drill: tap one target character, get graded on the first
//! completed group.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::engine::alphabet::{Alphabet, AlphabetEntry};
use crate::engine::classifier::{TimingConfig, TimingSource};
use crate::engine::input::InputEngine;
use crate::engine::signal::{Pattern, Signal};
use crate::feedback::{FeedbackEvent, FeedbackSink};
use crate::generator::ExerciseGenerating;
use crate::session::exercise::Difficulty;
use crate::stats::StatisticsSink;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrillState {
    Ready,
    Inputting,
    Correct { input_time: Duration },
    Incorrect { expected: Pattern, got: Pattern },
}

impl DrillState {
    pub fn is_graded(&self) -> bool {
        matches!(self, DrillState::Correct { .. } | DrillState::Incorrect { .. })
    }
}

pub struct SymbolDrill {
    target: AlphabetEntry,
    state: DrillState,
    engine: InputEngine,
    completed: Rc<RefCell<Option<Pattern>>>,
    input_started: Option<Instant>,
    attempts: usize,
    correct_count: usize,
    alphabet: &'static Alphabet,
    generator: Box<dyn ExerciseGenerating>,
    stats: Option<Box<dyn StatisticsSink>>,
    feedback: Option<Rc<dyn FeedbackSink>>,
}

impl SymbolDrill {
    /// Starts on a random symbol for `difficulty`.
    pub fn new(
        mut generator: Box<dyn ExerciseGenerating>,
        timing: Rc<dyn TimingSource>,
        difficulty: Difficulty,
    ) -> Self {
        let alphabet = Alphabet::standard();
        let target = Self::entry(alphabet, generator.random_symbol(difficulty));

        let completed = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&completed);
        let mut engine = InputEngine::new(timing);
        engine.set_difficulty(difficulty);
        engine.set_on_symbol_completed(move |pattern| {
            *slot.borrow_mut() = Some(pattern.clone());
        });

        Self {
            target,
            state: DrillState::Ready,
            engine,
            completed,
            input_started: None,
            attempts: 0,
            correct_count: 0,
            alphabet,
            generator,
            stats: None,
            feedback: None,
        }
    }

    // Generators only hand out alphabet characters; anything else drills 'E'.
    fn entry(alphabet: &Alphabet, symbol: char) -> AlphabetEntry {
        match alphabet.entry_for(symbol) {
            Some(entry) => entry.clone(),
            None => AlphabetEntry {
                character: 'E',
                pattern: Pattern::from_signals(&[Signal::Dot]),
            },
        }
    }

    pub fn with_statistics(mut self, stats: Box<dyn StatisticsSink>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_feedback(mut self, feedback: Rc<dyn FeedbackSink>) -> Self {
        self.engine.set_feedback(Some(Rc::clone(&feedback)));
        self.feedback = Some(feedback);
        self
    }

    /// Drills `symbol` instead of the current target. Unknown characters are
    /// refused.
    pub fn set_target(&mut self, symbol: char) -> bool {
        match self.alphabet.entry_for(symbol) {
            Some(entry) => {
                self.target = entry.clone();
                self.retry();
                true
            }
            None => false,
        }
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.engine.set_difficulty(difficulty);
    }

    pub fn difficulty(&self) -> Difficulty {
        self.engine.difficulty()
    }

    pub fn target(&self) -> char {
        self.target.character
    }

    pub fn target_pattern(&self) -> &Pattern {
        &self.target.pattern
    }

    pub fn state(&self) -> &DrillState {
        &self.state
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn timing(&self) -> TimingConfig {
        self.engine.timing()
    }

    pub fn pending_pattern(&self) -> String {
        self.engine.current_signals().to_string()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.engine.next_deadline()
    }

    pub fn press(&mut self, now: Instant) {
        if self.state.is_graded() {
            return;
        }
        self.input_started.get_or_insert(now);
        self.state = DrillState::Inputting;
        self.engine.press(now);
    }

    pub fn release(&mut self, now: Instant) {
        if !self.state.is_graded() {
            self.engine.release(now);
        }
    }

    pub fn delete_last(&mut self, now: Instant) {
        if !self.state.is_graded() {
            self.engine.delete_last(now);
        }
    }

    /// Polls the pause timer and grades the group it completes.
    pub fn tick(&mut self, now: Instant) {
        self.engine.tick(now);
        let completed = self.completed.borrow_mut().take();
        if let Some(pattern) = completed {
            self.grade(pattern, now);
        }
    }

    fn grade(&mut self, got: Pattern, now: Instant) {
        let input_time = self
            .input_started
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default();
        let is_correct = got == self.target.pattern;
        let symbol = self.target.character;

        self.attempts += 1;
        if is_correct {
            self.correct_count += 1;
            self.notify(FeedbackEvent::SymbolCompleted(symbol));
            self.state = DrillState::Correct { input_time };
        } else {
            self.notify(FeedbackEvent::SymbolRejected(got.clone()));
            self.state = DrillState::Incorrect {
                expected: self.target.pattern.clone(),
                got,
            };
        }
        debug!(%symbol, correct = is_correct, ?input_time, "drill graded");

        if let Some(stats) = self.stats.as_mut() {
            if let Err(err) = stats.record_symbol_attempt(symbol, is_correct, input_time) {
                warn!(%err, %symbol, "failed to record drill attempt");
            }
        }
    }

    fn notify(&self, event: FeedbackEvent) {
        if let Some(feedback) = &self.feedback {
            feedback.notify(event);
        }
    }

    /// Same symbol again.
    pub fn retry(&mut self) {
        self.engine.reset();
        self.completed.borrow_mut().take();
        self.input_started = None;
        self.state = DrillState::Ready;
    }

    /// Moves on to a fresh random symbol.
    pub fn next(&mut self) {
        let symbol = self.generator.random_symbol(self.difficulty());
        self.target = Self::entry(self.alphabet, symbol);
        self.retry();
    }
}
