pub mod exercise_generator;
pub mod word_bank;

use crate::session::exercise::{Difficulty, Exercise, ExerciseMode};

pub use exercise_generator::ExerciseGenerator;

pub trait ExerciseGenerating {
    fn generate(&mut self, mode: ExerciseMode, difficulty: Difficulty) -> Exercise;

    /// A single alphabet character for symbol drills.
    fn random_symbol(&mut self, difficulty: Difficulty) -> char;

    fn generate_many(
        &mut self,
        mode: ExerciseMode,
        difficulty: Difficulty,
        count: usize,
    ) -> Vec<Exercise> {
        (0..count).map(|_| self.generate(mode, difficulty)).collect()
    }
}
