use serde::{Deserialize, Serialize};

use crate::session::exercise::{Exercise, ExerciseMode};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_correct: bool,
    /// Expected answer as generated, not normalized.
    pub expected: String,
    /// Answer as submitted, not normalized.
    pub actual: String,
    pub mode: ExerciseMode,
}

pub trait ExerciseValidating {
    fn validate(&self, exercise: &Exercise, answer: &str) -> ValidationResult;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ExerciseValidator;

impl ExerciseValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ExerciseValidating for ExerciseValidator {
    fn validate(&self, exercise: &Exercise, answer: &str) -> ValidationResult {
        let expected = normalize(&exercise.expected_answer, exercise.mode);
        let actual = normalize(answer, exercise.mode);

        ValidationResult {
            is_correct: expected == actual,
            expected: exercise.expected_answer.clone(),
            actual: answer.to_string(),
            mode: exercise.mode,
        }
    }
}

pub fn normalize(answer: &str, mode: ExerciseMode) -> String {
    if mode.is_code_input() {
        normalize_code(answer)
    } else {
        normalize_text(answer)
    }
}

pub fn normalize_text(answer: &str) -> String {
    answer.trim().to_uppercase()
}

/// Single spaces between tokens, exactly one space on each side of `/`.
pub fn normalize_code(answer: &str) -> String {
    answer
        .replace('/', " / ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
