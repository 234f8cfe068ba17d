use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single classified tap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Dot,
    Dash,
}

impl Signal {
    pub fn as_char(self) -> char {
        match self {
            Signal::Dot => '.',
            Signal::Dash => '-',
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '.' => Some(Signal::Dot),
            '-' => Some(Signal::Dash),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PatternParseError {
    #[error("pattern is empty")]
    Empty,
    #[error("invalid character {0:?} in pattern (expected '.' or '-')")]
    InvalidChar(char),
}

/// Ordered sequence of signals, rendered as `.`/`-`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern(Vec<Signal>);

impl Pattern {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_signals(signals: &[Signal]) -> Self {
        Self(signals.to_vec())
    }

    pub fn signals(&self) -> &[Signal] {
        &self.0
    }

    pub fn push(&mut self, signal: Signal) {
        self.0.push(signal);
    }

    pub fn pop(&mut self) -> Option<Signal> {
        self.0.pop()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Moves the signals out, leaving this pattern empty.
    pub fn take(&mut self) -> Pattern {
        Pattern(std::mem::take(&mut self.0))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for signal in &self.0 {
            write!(f, "{}", signal.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for Pattern {
    type Err = PatternParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PatternParseError::Empty);
        }
        s.chars()
            .map(|ch| Signal::from_char(ch).ok_or(PatternParseError::InvalidChar(ch)))
            .collect::<Result<Vec<_>, _>>()
            .map(Pattern)
    }
}

impl From<Vec<Signal>> for Pattern {
    fn from(signals: Vec<Signal>) -> Self {
        Self(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_renders_dots_and_dashes() {
        let pattern = Pattern::from(vec![Signal::Dot, Signal::Dash, Signal::Dot]);
        assert_eq!(pattern.to_string(), ".-.");
    }

    #[test]
    fn test_parse_pattern() {
        let pattern: Pattern = "-..".parse().unwrap();
        assert_eq!(pattern.signals(), &[Signal::Dash, Signal::Dot, Signal::Dot]);
    }

    #[test]
    fn test_parse_rejects_empty_and_foreign_chars() {
        assert_eq!("".parse::<Pattern>(), Err(PatternParseError::Empty));
        assert_eq!(
            ".x-".parse::<Pattern>(),
            Err(PatternParseError::InvalidChar('x'))
        );
    }

    #[test]
    fn test_take_leaves_pattern_empty() {
        let mut pattern = Pattern::from(vec![Signal::Dash]);
        let taken = pattern.take();
        assert!(pattern.is_empty());
        assert_eq!(taken.len(), 1);
    }
}
