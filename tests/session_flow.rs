use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use morsetap::config::Config;
use morsetap::engine::alphabet::Alphabet;
use morsetap::engine::signal::Signal;
use morsetap::feedback::{FeedbackEvent, RecordingFeedback};
use morsetap::generator::ExerciseGenerator;
use morsetap::session::{Difficulty, ExerciseMode, ExerciseSession, SessionState};
use morsetap::stats::{BackgroundSink, MemoryStats};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Taps out `text` the way a user would at beginner speed and returns the
/// time after the final group has completed.
fn tap_text(session: &mut ExerciseSession, text: &str, start: Instant) -> Instant {
    let alphabet = Alphabet::standard();
    let mut t = start;
    for ch in text.chars() {
        if ch == ' ' {
            session.insert_space();
            continue;
        }
        let Some(pattern) = alphabet.symbol_for(ch) else {
            continue;
        };
        for signal in pattern.signals() {
            let hold = match signal {
                Signal::Dot => 100,
                Signal::Dash => 450,
            };
            session.press(t);
            t += ms(hold);
            session.release(t);
            t += ms(150);
            session.tick(t);
        }
        t += ms(1000);
        session.tick(t);
    }
    t
}

#[test]
fn tapped_session_completes_and_reports_statistics() {
    let t0 = Instant::now();
    let config = Rc::new(RefCell::new(Config::default()));
    let (sink, worker) = BackgroundSink::spawn(MemoryStats::new());
    let feedback = Rc::new(RecordingFeedback::new());

    let mut session = ExerciseSession::new(
        ExerciseMode::SentenceToCode,
        Difficulty::Beginner,
        3,
        Box::new(ExerciseGenerator::new(SmallRng::seed_from_u64(11))),
        config.clone(),
        t0,
    )
    .with_statistics(Box::new(sink))
    .with_feedback(feedback.clone());

    let mut t = t0;
    let mut symbols_tapped = 0;
    while !session.is_complete() {
        let content = session.current_exercise().prompt.clone();
        symbols_tapped += content.chars().filter(|c| c.is_alphanumeric()).count();

        t = tap_text(&mut session, &content, t);
        assert_eq!(session.display_answer(), content);
        assert!(session.can_submit());

        let result = session.submit(t).expect("submission accepted").clone();
        assert!(result.is_correct, "{result:?}");
        assert_eq!(session.state(), SessionState::ShowingResult);
        session.advance(t);
    }

    assert_eq!(session.correct_count(), 3);
    let completions = feedback
        .events()
        .iter()
        .filter(|e| matches!(e, FeedbackEvent::SymbolCompleted(_)))
        .count();
    assert_eq!(completions, symbols_tapped);

    drop(session);
    let stats = worker.join().expect("worker finished");
    let tally = stats.mode(ExerciseMode::SentenceToCode).unwrap();
    assert_eq!(tally.attempts, 3);
    assert_eq!(tally.correct, 3);
    let symbol_attempts: u32 = stats.symbols.values().map(|t| t.attempts).sum();
    assert_eq!(symbol_attempts as usize, symbols_tapped);
}

#[test]
fn difficulty_change_applies_to_the_next_press() {
    let t0 = Instant::now();
    let mut session = ExerciseSession::new(
        ExerciseMode::WordToCode,
        Difficulty::Beginner,
        5,
        Box::new(ExerciseGenerator::new(SmallRng::seed_from_u64(3))),
        Rc::new(Config::default()),
        t0,
    );

    // 250ms is a dot at beginner (dash from 300ms).
    session.press(t0);
    session.release(t0 + ms(250));
    assert_eq!(session.pending_pattern(), ".");

    // ...and a dash at advanced (dash from 140ms).
    session.set_difficulty(Difficulty::Advanced);
    session.press(t0 + ms(300));
    session.release(t0 + ms(550));
    assert_eq!(session.pending_pattern(), ".-");

    // Advanced pause is 420ms.
    session.tick(t0 + ms(550 + 419));
    assert!(session.has_pending_input());
    session.tick(t0 + ms(550 + 420));
    assert!(!session.has_pending_input());
    assert_eq!(session.display_answer(), "A");
}

#[test]
fn edited_base_timing_is_picked_up_live() {
    let t0 = Instant::now();
    let config = Rc::new(RefCell::new(Config::default()));
    let mut session = ExerciseSession::new(
        ExerciseMode::WordToCode,
        Difficulty::Intermediate,
        5,
        Box::new(ExerciseGenerator::new(SmallRng::seed_from_u64(9))),
        config.clone(),
        t0,
    );

    session.press(t0);
    session.release(t0 + ms(250));
    assert_eq!(session.pending_pattern(), "-");

    config.borrow_mut().dash_min_ms = 400;
    session.press(t0 + ms(300));
    session.release(t0 + ms(550));
    assert_eq!(session.pending_pattern(), "-.");
}

#[test]
fn text_mode_round_trip_through_typed_answers() {
    let t0 = Instant::now();
    let mut session = ExerciseSession::new(
        ExerciseMode::CodeToWord,
        Difficulty::Intermediate,
        2,
        Box::new(ExerciseGenerator::new(SmallRng::seed_from_u64(5))),
        Rc::new(Config::default()),
        t0,
    );

    let answer = session.current_exercise().expected_answer.to_lowercase();
    for ch in answer.chars() {
        session.type_char(ch);
    }
    // Taps are ignored when the answer is text.
    session.press(t0);
    session.release(t0 + ms(500));
    assert!(!session.has_pending_input());

    assert!(session.submit(t0 + ms(2000)).unwrap().is_correct);
    session.advance(t0 + ms(2100));
    assert_eq!(session.progress_text(), "2 / 2");

    session.set_typed_answer("definitely wrong");
    assert!(!session.submit(t0 + ms(4000)).unwrap().is_correct);
    session.advance(t0 + ms(4100));
    assert!(session.is_complete());
    assert_eq!(session.correct_count(), 1);
}
