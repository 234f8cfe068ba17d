//! Tap input state machine.
//!
//! ```text
//!            press               release
//!   Idle ─────────────> PressHeld ─────────> AwaitingPause
//!    ^                     ^                    │    │
//!    │                     └──── press ─────────┘    │
//!    └──────── pause timer fires / reset ────────────┘
//! ```
//!
//! All operations take the current instant from the caller. The pause timer
//! is polled through [`InputEngine::tick`], so the engine never sleeps and can
//! be driven by a real event loop or a virtual clock alike.

use std::rc::Rc;
use std::time::Instant;

use tracing::debug;

use crate::engine::classifier::{TimingConfig, TimingSource, classify};
use crate::engine::signal::Pattern;
use crate::engine::timer::CompletionTimer;
use crate::feedback::{FeedbackEvent, FeedbackSink};
use crate::session::exercise::Difficulty;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputState {
    Idle,
    PressHeld,
    AwaitingPause,
}

type CompletionCallback = Box<dyn FnMut(&Pattern)>;

pub struct InputEngine {
    signals: Pattern,
    press_start: Option<Instant>,
    timer: CompletionTimer,
    timing: Rc<dyn TimingSource>,
    difficulty: Difficulty,
    feedback: Option<Rc<dyn FeedbackSink>>,
    on_completed: Option<CompletionCallback>,
}

impl InputEngine {
    pub fn new(timing: Rc<dyn TimingSource>) -> Self {
        Self {
            signals: Pattern::new(),
            press_start: None,
            timer: CompletionTimer::new(),
            timing,
            difficulty: Difficulty::Intermediate,
            feedback: None,
            on_completed: None,
        }
    }

    pub fn with_feedback(mut self, feedback: Rc<dyn FeedbackSink>) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn set_timing_source(&mut self, timing: Rc<dyn TimingSource>) {
        self.timing = timing;
    }

    /// Scales the source's base timing from the next press on.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Thresholds in effect right now: the source's base timing scaled by
    /// the difficulty multiplier.
    pub fn timing(&self) -> TimingConfig {
        self.timing
            .timing_config()
            .scaled(self.difficulty.timing_multiplier())
    }

    pub fn set_feedback(&mut self, feedback: Option<Rc<dyn FeedbackSink>>) {
        self.feedback = feedback;
    }

    pub fn set_on_symbol_completed(&mut self, callback: impl FnMut(&Pattern) + 'static) {
        self.on_completed = Some(Box::new(callback));
    }

    pub fn current_signals(&self) -> &Pattern {
        &self.signals
    }

    pub fn has_pending_signals(&self) -> bool {
        !self.signals.is_empty()
    }

    pub fn state(&self) -> InputState {
        if self.press_start.is_some() {
            InputState::PressHeld
        } else if self.timer.is_armed() {
            InputState::AwaitingPause
        } else {
            InputState::Idle
        }
    }

    /// When the pending pause timer is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn press(&mut self, at: Instant) {
        self.timer.cancel();
        self.press_start = Some(at);
    }

    /// Classifies the press that started at the last `press`. A release with
    /// no press in flight is ignored.
    pub fn release(&mut self, at: Instant) {
        let Some(start) = self.press_start.take() else {
            return;
        };
        self.timer.cancel();

        let timing = self.timing();
        let signal = classify(at.saturating_duration_since(start), &timing);
        self.signals.push(signal);
        debug!(?signal, pattern = %self.signals, "signal appended");

        if let Some(feedback) = &self.feedback {
            feedback.notify(FeedbackEvent::SignalAppended(signal));
        }

        self.timer.arm(at, timing.symbol_pause);
    }

    /// Polls the pause timer; returns the completed group when it fires.
    pub fn tick(&mut self, now: Instant) -> Option<Pattern> {
        if !self.timer.poll(now) {
            return None;
        }
        self.complete()
    }

    /// Completes the in-flight group immediately, cancelling the pause timer.
    pub fn flush(&mut self) -> Option<Pattern> {
        self.timer.cancel();
        self.complete()
    }

    pub fn delete_last(&mut self, now: Instant) {
        if self.signals.pop().is_none() {
            return;
        }
        self.timer.cancel();
        if !self.signals.is_empty() && self.press_start.is_none() {
            let pause = self.timing().symbol_pause;
            self.timer.arm(now, pause);
        }
    }

    pub fn reset(&mut self) {
        self.timer.cancel();
        self.signals.clear();
        self.press_start = None;
    }

    fn complete(&mut self) -> Option<Pattern> {
        if self.signals.is_empty() {
            return None;
        }
        let pattern = self.signals.take();
        debug!(%pattern, "symbol group completed");
        if let Some(callback) = self.on_completed.as_mut() {
            callback(&pattern);
        }
        Some(pattern)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::time::Duration;

    use super::*;
    use crate::engine::signal::Signal;
    use crate::feedback::RecordingFeedback;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn engine_with_pause(pause_ms: u64) -> InputEngine {
        InputEngine::new(Rc::new(TimingConfig {
            symbol_pause: ms(pause_ms),
            ..TimingConfig::default()
        }))
    }

    fn tap(engine: &mut InputEngine, at: Instant, hold_ms: u64) -> Instant {
        engine.press(at);
        let up = at + ms(hold_ms);
        engine.release(up);
        up
    }

    #[test]
    fn test_short_press_is_dot_long_press_is_dash() {
        let mut engine = engine_with_pause(600);
        let t0 = Instant::now();
        tap(&mut engine, t0, 100);
        tap(&mut engine, t0 + ms(150), 300);
        assert_eq!(engine.current_signals().signals(), &[Signal::Dot, Signal::Dash]);
        assert_eq!(engine.state(), InputState::AwaitingPause);
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut engine = engine_with_pause(600);
        engine.release(Instant::now());
        assert!(engine.current_signals().is_empty());
        assert_eq!(engine.state(), InputState::Idle);
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_pause_completes_single_dot() {
        let mut engine = engine_with_pause(100);
        let completed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&completed);
        engine.set_on_symbol_completed(move |p| sink.borrow_mut().push(p.clone()));

        let t0 = Instant::now();
        let up = tap(&mut engine, t0, 50);

        assert_eq!(engine.tick(up + ms(99)), None);
        let fired = engine.tick(up + ms(100)).unwrap();
        assert_eq!(fired.signals(), &[Signal::Dot]);
        assert_eq!(engine.tick(up + ms(200)), None);

        assert_eq!(completed.borrow().len(), 1);
        assert!(engine.current_signals().is_empty());
        assert_eq!(engine.state(), InputState::Idle);
    }

    #[test]
    fn test_new_press_cancels_pending_completion() {
        let mut engine = engine_with_pause(150);
        let t0 = Instant::now();
        let up = tap(&mut engine, t0, 50);

        engine.press(up + ms(50));
        assert_eq!(engine.state(), InputState::PressHeld);
        // The first group's deadline passes while the key is held.
        assert_eq!(engine.tick(up + ms(300)), None);

        let second_up = up + ms(350);
        engine.release(second_up);
        let fired = engine.tick(second_up + ms(150)).unwrap();
        assert_eq!(fired.signals(), &[Signal::Dot, Signal::Dash]);
    }

    #[test]
    fn test_signal_count_matches_completed_pairs() {
        let mut engine = engine_with_pause(1000);
        let mut t = Instant::now();
        for i in 0..5 {
            t = tap(&mut engine, t + ms(10), 50 + i * 60);
            assert_eq!(engine.current_signals().len() as u64, i + 1);
        }
    }

    #[test]
    fn test_reset_cancels_pending_completion() {
        let mut engine = engine_with_pause(100);
        let t0 = Instant::now();
        let up = tap(&mut engine, t0, 50);
        engine.reset();
        assert_eq!(engine.tick(up + ms(500)), None);
        assert!(engine.current_signals().is_empty());
        assert_eq!(engine.state(), InputState::Idle);
    }

    #[test]
    fn test_reset_drops_in_progress_press() {
        let mut engine = engine_with_pause(100);
        let t0 = Instant::now();
        engine.press(t0);
        engine.reset();
        engine.release(t0 + ms(50));
        assert!(engine.current_signals().is_empty());
    }

    #[test]
    fn test_delete_last_restarts_pause() {
        let mut engine = engine_with_pause(100);
        let t0 = Instant::now();
        tap(&mut engine, t0, 50);
        let up = tap(&mut engine, t0 + ms(60), 300);

        let deleted_at = up + ms(80);
        engine.delete_last(deleted_at);
        assert_eq!(engine.current_signals().signals(), &[Signal::Dot]);
        // Original deadline (up + 100) no longer applies.
        assert_eq!(engine.tick(up + ms(120)), None);
        let fired = engine.tick(deleted_at + ms(100)).unwrap();
        assert_eq!(fired.signals(), &[Signal::Dot]);
    }

    #[test]
    fn test_deleting_every_signal_cancels_completion() {
        let mut engine = engine_with_pause(100);
        let t0 = Instant::now();
        let up = tap(&mut engine, t0, 50);
        engine.delete_last(up);
        assert_eq!(engine.tick(up + ms(500)), None);
        assert_eq!(engine.state(), InputState::Idle);
    }

    #[test]
    fn test_delete_on_empty_does_nothing() {
        let mut engine = engine_with_pause(100);
        engine.delete_last(Instant::now());
        assert!(engine.current_signals().is_empty());
    }

    #[test]
    fn test_flush_completes_immediately() {
        let mut engine = engine_with_pause(1000);
        let t0 = Instant::now();
        let up = tap(&mut engine, t0, 300);
        let fired = engine.flush().unwrap();
        assert_eq!(fired.signals(), &[Signal::Dash]);
        assert_eq!(engine.tick(up + ms(2000)), None);
        assert_eq!(engine.flush(), None);
    }

    #[test]
    fn test_timing_source_is_read_at_release() {
        let config = Rc::new(RefCell::new(TimingConfig::default()));
        let mut engine = InputEngine::new(config.clone());
        let t0 = Instant::now();
        tap(&mut engine, t0, 400);
        config.borrow_mut().dash_min = ms(500);
        tap(&mut engine, t0 + ms(500), 400);
        assert_eq!(engine.current_signals().signals(), &[Signal::Dash, Signal::Dot]);
    }

    #[test]
    fn test_delete_while_held_waits_for_release() {
        let mut engine = engine_with_pause(100);
        let t0 = Instant::now();
        tap(&mut engine, t0, 50);
        tap(&mut engine, t0 + ms(60), 50);

        engine.press(t0 + ms(130));
        engine.delete_last(t0 + ms(140));
        assert_eq!(engine.current_signals().signals(), &[Signal::Dot]);
        assert_eq!(engine.state(), InputState::PressHeld);
        assert_eq!(engine.next_deadline(), None);
        assert_eq!(engine.tick(t0 + ms(1000)), None);

        let up = t0 + ms(1050);
        engine.release(up);
        let fired = engine.tick(up + ms(100)).unwrap();
        assert_eq!(fired.signals(), &[Signal::Dot, Signal::Dash]);
    }

    #[test]
    fn test_difficulty_scales_source_timing() {
        let mut engine = engine_with_pause(600);
        engine.set_difficulty(Difficulty::Advanced);
        assert_eq!(engine.timing().dash_min, ms(140));

        let t0 = Instant::now();
        let up = tap(&mut engine, t0, 150);
        assert_eq!(engine.current_signals().signals(), &[Signal::Dash]);
        assert_eq!(engine.next_deadline(), Some(up + ms(420)));

        engine.set_difficulty(Difficulty::Beginner);
        tap(&mut engine, up + ms(10), 250);
        assert_eq!(engine.current_signals().signals(), &[Signal::Dash, Signal::Dot]);
    }

    #[test]
    fn test_signal_appended_feedback() {
        let feedback = Rc::new(RecordingFeedback::new());
        let mut engine = engine_with_pause(100).with_feedback(feedback.clone());
        tap(&mut engine, Instant::now(), 10);
        assert_eq!(
            feedback.events(),
            vec![FeedbackEvent::SignalAppended(Signal::Dot)]
        );
    }
}
