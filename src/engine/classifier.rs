use std::cell::RefCell;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::signal::Signal;

pub const DEFAULT_DOT_MAX: Duration = Duration::from_millis(200);
pub const DEFAULT_DASH_MIN: Duration = Duration::from_millis(200);
pub const DEFAULT_SYMBOL_PAUSE: Duration = Duration::from_millis(600);

/// Press/pause thresholds.
///
/// Only `dash_min` takes part in classification. `dot_max` is carried for
/// display and configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub dot_max: Duration,
    pub dash_min: Duration,
    pub symbol_pause: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            dot_max: DEFAULT_DOT_MAX,
            dash_min: DEFAULT_DASH_MIN,
            symbol_pause: DEFAULT_SYMBOL_PAUSE,
        }
    }
}

impl TimingConfig {
    pub fn scaled(&self, multiplier: f64) -> Self {
        let multiplier = multiplier.max(0.0);
        Self {
            dot_max: scale(self.dot_max, multiplier),
            dash_min: scale(self.dash_min, multiplier),
            symbol_pause: scale(self.symbol_pause, multiplier),
        }
    }
}

// Rounded to the nearest nanosecond so 600ms * 1.5 is exactly 900ms.
fn scale(duration: Duration, multiplier: f64) -> Duration {
    Duration::from_nanos((duration.as_nanos() as f64 * multiplier).round() as u64)
}

/// Supplies base timing, before any difficulty multiplier. Read on every
/// press/release, never cached.
pub trait TimingSource {
    fn timing_config(&self) -> TimingConfig;
}

impl TimingSource for TimingConfig {
    fn timing_config(&self) -> TimingConfig {
        *self
    }
}

impl<T: TimingSource> TimingSource for RefCell<T> {
    fn timing_config(&self) -> TimingConfig {
        match self.try_borrow() {
            Ok(inner) => inner.timing_config(),
            Err(_) => {
                warn!("timing source is being edited; using default timing");
                TimingConfig::default()
            }
        }
    }
}

pub fn classify(duration: Duration, config: &TimingConfig) -> Signal {
    if duration >= config.dash_min {
        Signal::Dash
    } else {
        Signal::Dot
    }
}
