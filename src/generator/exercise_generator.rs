use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::engine::alphabet::Alphabet;
use crate::generator::ExerciseGenerating;
use crate::generator::word_bank::{self, FALLBACK_SENTENCE, FALLBACK_WORD};
use crate::session::exercise::{Difficulty, Exercise, ExerciseMode};

pub struct ExerciseGenerator {
    alphabet: &'static Alphabet,
    rng: SmallRng,
}

impl ExerciseGenerator {
    pub fn new(rng: SmallRng) -> Self {
        Self {
            alphabet: Alphabet::standard(),
            rng,
        }
    }

    fn select_content(&mut self, mode: ExerciseMode, difficulty: Difficulty) -> &'static str {
        if mode.is_sentence_mode() {
            word_bank::sentences(difficulty)
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(FALLBACK_SENTENCE)
        } else {
            word_bank::words(difficulty)
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(FALLBACK_WORD)
        }
    }

    /// Builds an exercise from given content, pointing prompt and answer the
    /// way `mode` asks.
    pub fn exercise_for(&self, content: &str, mode: ExerciseMode, difficulty: Difficulty) -> Exercise {
        let content = content.to_uppercase();
        let morse = self.alphabet.encode_text(&content);
        let symbol_count = content.chars().filter(|c| c.is_alphanumeric()).count();

        let (prompt, expected) = if mode.is_code_input() {
            (content.as_str(), morse.as_str())
        } else {
            (morse.as_str(), content.as_str())
        };

        Exercise::new(mode, prompt, expected, difficulty, symbol_count)
    }
}

impl ExerciseGenerating for ExerciseGenerator {
    fn generate(&mut self, mode: ExerciseMode, difficulty: Difficulty) -> Exercise {
        let content = self.select_content(mode, difficulty);
        self.exercise_for(content, mode, difficulty)
    }

    fn random_symbol(&mut self, difficulty: Difficulty) -> char {
        let candidates: Vec<char> = self
            .alphabet
            .all_entries()
            .iter()
            .map(|e| e.character)
            .filter(|c| difficulty != Difficulty::Beginner || c.is_ascii_alphabetic())
            .collect();
        candidates.choose(&mut self.rng).copied().unwrap_or('E')
    }
}
