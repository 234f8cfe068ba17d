use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::classifier::{TimingConfig, TimingSource};
use crate::session::exercise::{Difficulty, ExerciseMode};

const MIN_DURATION_MS: u64 = 20;
const MAX_DURATION_MS: u64 = 5000;
const MAX_EXERCISE_COUNT: usize = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_dot_max_ms")]
    pub dot_max_ms: u64,
    #[serde(default = "default_dash_min_ms")]
    pub dash_min_ms: u64,
    #[serde(default = "default_symbol_pause_ms")]
    pub symbol_pause_ms: u64,
    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,
    #[serde(default = "default_mode")]
    pub mode: ExerciseMode,
    #[serde(default = "default_exercise_count")]
    pub exercise_count: usize,
    #[serde(default = "default_sound_enabled")]
    pub sound_enabled: bool,
    #[serde(default = "default_vibration_enabled")]
    pub vibration_enabled: bool,
}

fn default_dot_max_ms() -> u64 {
    200
}
fn default_dash_min_ms() -> u64 {
    200
}
fn default_symbol_pause_ms() -> u64 {
    600
}
fn default_difficulty() -> Difficulty {
    Difficulty::Beginner
}
fn default_mode() -> ExerciseMode {
    ExerciseMode::WordToCode
}
fn default_exercise_count() -> usize {
    10
}
fn default_sound_enabled() -> bool {
    true
}
fn default_vibration_enabled() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dot_max_ms: default_dot_max_ms(),
            dash_min_ms: default_dash_min_ms(),
            symbol_pause_ms: default_symbol_pause_ms(),
            difficulty: default_difficulty(),
            mode: default_mode(),
            exercise_count: default_exercise_count(),
            sound_enabled: default_sound_enabled(),
            vibration_enabled: default_vibration_enabled(),
        }
    }
}

impl Config {
    /// Loads from the platform config directory. A missing file yields
    /// defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str::<Config>(&content)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            Config::default()
        };
        config.validate();
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("morsetap")
            .join("config.toml")
    }

    /// Clamp hand-edited values back into a usable range.
    pub fn validate(&mut self) {
        for ms in [
            &mut self.dot_max_ms,
            &mut self.dash_min_ms,
            &mut self.symbol_pause_ms,
        ] {
            *ms = (*ms).clamp(MIN_DURATION_MS, MAX_DURATION_MS);
        }
        self.exercise_count = self.exercise_count.clamp(1, MAX_EXERCISE_COUNT);
    }

    pub fn reset_to_defaults(&mut self) {
        *self = Config::default();
    }

    /// Configured durations before the difficulty multiplier.
    pub fn base_timing(&self) -> TimingConfig {
        TimingConfig {
            dot_max: Duration::from_millis(self.dot_max_ms),
            dash_min: Duration::from_millis(self.dash_min_ms),
            symbol_pause: Duration::from_millis(self.symbol_pause_ms),
        }
    }
}

/// Hands out the base durations; the input engine applies its own
/// difficulty on top.
impl TimingSource for Config {
    fn timing_config(&self) -> TimingConfig {
        self.base_timing()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let file = write_config("difficulty = \"advanced\"\nmode = \"code-to-sentence\"\n");
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.difficulty, Difficulty::Advanced);
        assert_eq!(config.mode, ExerciseMode::CodeToSentence);
        assert_eq!(config.symbol_pause_ms, 600);
        assert_eq!(config.exercise_count, 10);
        assert!(config.sound_enabled);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let file = write_config("dash_min_ms = 1\nsymbol_pause_ms = 90000\nexercise_count = 0\n");
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.dash_min_ms, 20);
        assert_eq!(config.symbol_pause_ms, 5000);
        assert_eq!(config.exercise_count, 1);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let file = write_config("difficulty = \"legendary\"\n");
        assert!(Config::load_from(file.path()).is_err());
    }

    #[test]
    fn test_timing_source_is_unscaled_and_live() {
        let config = RefCell::new(Config::default());
        assert_eq!(config.timing_config().dash_min, Duration::from_millis(200));

        config.borrow_mut().difficulty = Difficulty::Advanced;
        assert_eq!(config.timing_config().dash_min, Duration::from_millis(200));

        config.borrow_mut().symbol_pause_ms = 800;
        assert_eq!(config.timing_config().symbol_pause, Duration::from_millis(800));
    }

    #[test]
    fn test_reset_to_defaults() {
        let mut config = Config {
            exercise_count: 42,
            sound_enabled: false,
            ..Config::default()
        };
        config.reset_to_defaults();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = Config {
            difficulty: Difficulty::Intermediate,
            ..Config::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("difficulty = \"intermediate\""));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
