pub mod answer;
pub mod drill;
pub mod exercise;
pub mod practice;

pub use drill::{DrillState, SymbolDrill};
pub use exercise::{Difficulty, Exercise, ExerciseId, ExerciseMode};
pub use practice::{ExerciseSession, SessionState};
