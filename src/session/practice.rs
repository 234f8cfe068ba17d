//! A fixed-length run of generated exercises.
//!
//! ```text
//!                 submit                 advance (more left)
//!   InProgress ───────────> ShowingResult ───────────────────> InProgress
//!                                │
//!                                │ advance (last exercise)
//!                                v
//!                             Complete
//! ```
//!
//! `restart` returns to `InProgress` at index 0 from any state. Input calls
//! made outside `InProgress` are ignored.

use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::engine::alphabet::Alphabet;
use crate::engine::classifier::{TimingConfig, TimingSource};
use crate::engine::input::InputEngine;
use crate::engine::signal::Pattern;
use crate::engine::validator::{ExerciseValidating, ExerciseValidator, ValidationResult};
use crate::feedback::{FeedbackEvent, FeedbackSink};
use crate::generator::ExerciseGenerating;
use crate::session::answer::AnswerBuffer;
use crate::session::exercise::{Difficulty, Exercise, ExerciseMode};
use crate::stats::StatisticsSink;

pub const DEFAULT_EXERCISE_COUNT: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    InProgress,
    ShowingResult,
    Complete,
}

pub struct ExerciseSession {
    mode: ExerciseMode,
    total: usize,
    index: usize,
    state: SessionState,
    exercise: Exercise,
    answer: AnswerBuffer,
    engine: InputEngine,
    last_result: Option<ValidationResult>,
    started_at: Instant,
    correct_count: usize,
    alphabet: &'static Alphabet,
    generator: Box<dyn ExerciseGenerating>,
    validator: Box<dyn ExerciseValidating>,
    stats: Option<Box<dyn StatisticsSink>>,
    feedback: Option<Rc<dyn FeedbackSink>>,
}

impl ExerciseSession {
    pub fn new(
        mode: ExerciseMode,
        difficulty: Difficulty,
        total: usize,
        mut generator: Box<dyn ExerciseGenerating>,
        timing: Rc<dyn TimingSource>,
        now: Instant,
    ) -> Self {
        let exercise = generator.generate(mode, difficulty);
        let mut engine = InputEngine::new(timing);
        engine.set_difficulty(difficulty);
        Self {
            mode,
            total: total.max(1),
            index: 0,
            state: SessionState::InProgress,
            exercise,
            answer: AnswerBuffer::new(),
            engine,
            last_result: None,
            started_at: now,
            correct_count: 0,
            alphabet: Alphabet::standard(),
            generator,
            validator: Box::new(ExerciseValidator::new()),
            stats: None,
            feedback: None,
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

    pub fn with_validator(mut self, validator: Box<dyn ExerciseValidating>) -> Self {
        self.validator = validator;
        self
    }

    /// Press timing follows from the next press; content from the next
    /// exercise.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.engine.set_difficulty(difficulty);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> ExerciseMode {
        self.mode
    }

    pub fn difficulty(&self) -> Difficulty {
        self.engine.difficulty()
    }

    pub fn timing(&self) -> TimingConfig {
        self.engine.timing()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn current_exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn last_result(&self) -> Option<&ValidationResult> {
        self.last_result.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    pub fn progress_text(&self) -> String {
        format!("{} / {}", self.index + 1, self.total)
    }

    pub fn pending_pattern(&self) -> String {
        self.engine.current_signals().to_string()
    }

    pub fn has_pending_input(&self) -> bool {
        self.engine.has_pending_signals()
    }

    /// When the driver should next call [`ExerciseSession::tick`].
    pub fn next_deadline(&self) -> Option<Instant> {
        self.engine.next_deadline()
    }

    /// The answer as it would be submitted.
    pub fn current_answer(&self) -> String {
        if self.mode.is_code_input() {
            self.answer.encoded(self.alphabet)
        } else {
            self.answer.typed().to_string()
        }
    }

    /// Committed symbols followed by the pattern still being tapped.
    pub fn display_answer(&self) -> String {
        if self.mode.is_code_input() {
            format!("{}{}", self.answer.symbols_text(), self.pending_pattern())
        } else {
            self.answer.typed().to_string()
        }
    }

    pub fn can_submit(&self) -> bool {
        self.state == SessionState::InProgress
            && !self.engine.has_pending_signals()
            && !self.current_answer().trim().is_empty()
    }

    pub fn load_next(&mut self, now: Instant) {
        self.exercise = self.generator.generate(self.mode, self.difficulty());
        self.answer.clear();
        self.engine.reset();
        self.last_result = None;
        self.state = SessionState::InProgress;
        self.started_at = now;
        debug!(
            index = self.index,
            prompt = %self.exercise.prompt,
            "exercise loaded"
        );
    }

    fn accepts_taps(&self) -> bool {
        self.state == SessionState::InProgress && self.mode.is_code_input()
    }

    fn accepts_typing(&self) -> bool {
        self.state == SessionState::InProgress && !self.mode.is_code_input()
    }

    pub fn press(&mut self, now: Instant) {
        if self.accepts_taps() {
            self.engine.press(now);
        }
    }

    pub fn release(&mut self, now: Instant) {
        if self.accepts_taps() {
            self.engine.release(now);
        }
    }

    /// Drives the pause timer; commits a symbol group when it completes.
    pub fn tick(&mut self, now: Instant) {
        if let Some(pattern) = self.engine.tick(now) {
            self.commit(pattern);
        }
    }

    /// Finishes any in-flight group, then adds a word separator.
    pub fn insert_space(&mut self) {
        if !self.accepts_taps() {
            return;
        }
        if let Some(pattern) = self.engine.flush() {
            self.commit(pattern);
        }
        self.answer.push_space();
    }

    pub fn type_char(&mut self, ch: char) {
        if self.accepts_typing() {
            self.answer.type_char(ch);
        }
    }

    pub fn set_typed_answer(&mut self, text: &str) {
        if self.accepts_typing() {
            self.answer.set_typed(text);
        }
    }

    /// Removes a pending signal if there is one, else the last committed
    /// character.
    pub fn delete_last(&mut self, now: Instant) {
        if self.state != SessionState::InProgress {
            return;
        }
        if !self.mode.is_code_input() {
            self.answer.pop_typed();
        } else if self.engine.has_pending_signals() {
            self.engine.delete_last(now);
        } else {
            self.answer.pop_symbol();
        }
    }

    pub fn clear_answer(&mut self) {
        if self.state == SessionState::InProgress {
            self.answer.clear();
            self.engine.reset();
        }
    }

    fn commit(&mut self, pattern: Pattern) {
        match self.alphabet.character_for(&pattern) {
            Some(ch) => {
                self.answer.push_symbol(ch);
                debug!(%pattern, symbol = %ch, "symbol decoded");
                self.notify(FeedbackEvent::SymbolCompleted(ch));
            }
            None => {
                debug!(%pattern, "undecodable pattern dropped");
                self.notify(FeedbackEvent::SymbolRejected(pattern));
            }
        }
    }

    fn notify(&self, event: FeedbackEvent) {
        if let Some(feedback) = &self.feedback {
            feedback.notify(event);
        }
    }

    /// Validates the current answer. Returns `None` when submission isn't
    /// possible right now.
    pub fn submit(&mut self, now: Instant) -> Option<&ValidationResult> {
        if !self.can_submit() {
            return None;
        }

        let answer = self.current_answer();
        let result = self.validator.validate(&self.exercise, &answer);
        let elapsed = now.saturating_duration_since(self.started_at);
        self.engine.reset();

        if result.is_correct {
            self.correct_count += 1;
        }
        debug!(
            correct = result.is_correct,
            expected = %result.expected,
            actual = %result.actual,
            "answer submitted"
        );

        self.report(result.is_correct, elapsed);
        self.state = SessionState::ShowingResult;
        self.last_result = Some(result);
        self.last_result.as_ref()
    }

    fn report(&mut self, is_correct: bool, elapsed: Duration) {
        let Some(stats) = self.stats.as_mut() else {
            return;
        };

        if let Err(err) = stats.record_exercise_attempt(self.mode, is_correct, elapsed) {
            warn!(%err, "failed to record exercise attempt");
        }

        let symbols: Vec<char> = self
            .exercise
            .content()
            .to_uppercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        if symbols.is_empty() {
            return;
        }
        let per_symbol = elapsed / symbols.len() as u32;
        for symbol in symbols {
            if let Err(err) = stats.record_symbol_attempt(symbol, is_correct, per_symbol) {
                warn!(%err, %symbol, "failed to record symbol attempt");
            }
        }
    }

    pub fn advance(&mut self, now: Instant) {
        if self.state != SessionState::ShowingResult {
            return;
        }
        if self.index + 1 >= self.total {
            self.state = SessionState::Complete;
            debug!(
                correct = self.correct_count,
                total = self.total,
                "session complete"
            );
        } else {
            self.index += 1;
            self.load_next(now);
        }
    }

    pub fn restart(&mut self, now: Instant) {
        self.index = 0;
        self.correct_count = 0;
        self.load_next(now);
    }
}
