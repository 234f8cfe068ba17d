use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn timing_multiplier(self) -> f64 {
        match self {
            Difficulty::Beginner => 1.5,
            Difficulty::Intermediate => 1.0,
            Difficulty::Advanced => 0.7,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Slower timing, more forgiving",
            Difficulty::Intermediate => "Standard Morse timing",
            Difficulty::Advanced => "Faster timing, more precise",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseMode {
    CodeToWord,
    CodeToSentence,
    WordToCode,
    SentenceToCode,
}

impl ExerciseMode {
    pub const ALL: [ExerciseMode; 4] = [
        ExerciseMode::CodeToWord,
        ExerciseMode::CodeToSentence,
        ExerciseMode::WordToCode,
        ExerciseMode::SentenceToCode,
    ];

    /// The answer is Morse rather than plain text.
    pub fn is_code_input(self) -> bool {
        matches!(self, ExerciseMode::WordToCode | ExerciseMode::SentenceToCode)
    }

    pub fn is_sentence_mode(self) -> bool {
        matches!(
            self,
            ExerciseMode::CodeToSentence | ExerciseMode::SentenceToCode
        )
    }

    pub fn title(self) -> &'static str {
        match self {
            ExerciseMode::CodeToWord => "Code to Word",
            ExerciseMode::CodeToSentence => "Code to Sentence",
            ExerciseMode::WordToCode => "Word to Code",
            ExerciseMode::SentenceToCode => "Sentence to Code",
        }
    }
}

impl fmt::Display for ExerciseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

static NEXT_EXERCISE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExerciseId(u64);

impl ExerciseId {
    pub fn next() -> Self {
        Self(NEXT_EXERCISE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    pub mode: ExerciseMode,
    pub prompt: String,
    pub expected_answer: String,
    pub difficulty: Difficulty,
    /// Alphanumeric characters in the content.
    pub symbol_count: usize,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    pub fn new(
        mode: ExerciseMode,
        prompt: &str,
        expected_answer: &str,
        difficulty: Difficulty,
        symbol_count: usize,
    ) -> Self {
        Self {
            id: ExerciseId::next(),
            mode,
            prompt: prompt.to_string(),
            expected_answer: expected_answer.to_string(),
            difficulty,
            symbol_count,
            created_at: Utc::now(),
        }
    }

    /// The plain-text side of the exercise, whichever way round it is asked.
    pub fn content(&self) -> &str {
        if self.mode.is_code_input() {
            &self.prompt
        } else {
            &self.expected_answer
        }
    }
}
