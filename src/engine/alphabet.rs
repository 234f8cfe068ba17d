use std::collections::HashMap;
use std::sync::OnceLock;

use crate::engine::signal::{Pattern, Signal};

const TABLE: [(char, &str); 36] = [
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphabetEntry {
    pub character: char,
    pub pattern: Pattern,
}

/// Bidirectional character <-> pattern table. Immutable after construction.
pub struct Alphabet {
    entries: Vec<AlphabetEntry>,
    by_char: HashMap<char, usize>,
    by_pattern: HashMap<Pattern, usize>,
}

impl Alphabet {
    pub fn new() -> Self {
        let entries: Vec<AlphabetEntry> = TABLE
            .iter()
            .map(|&(character, code)| AlphabetEntry {
                character,
                pattern: Pattern::from(code.chars().filter_map(Signal::from_char).collect::<Vec<_>>()),
            })
            .collect();

        let by_char = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.character, i))
            .collect();
        let by_pattern = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.pattern.clone(), i))
            .collect();

        Self {
            entries,
            by_char,
            by_pattern,
        }
    }

    /// Shared table, built on first use.
    pub fn standard() -> &'static Alphabet {
        static STANDARD: OnceLock<Alphabet> = OnceLock::new();
        STANDARD.get_or_init(Alphabet::new)
    }

    pub fn all_entries(&self) -> &[AlphabetEntry] {
        &self.entries
    }

    pub fn entry_for(&self, ch: char) -> Option<&AlphabetEntry> {
        let upper = ch.to_ascii_uppercase();
        self.by_char.get(&upper).map(|&i| &self.entries[i])
    }

    pub fn symbol_for(&self, ch: char) -> Option<&Pattern> {
        self.entry_for(ch).map(|e| &e.pattern)
    }

    pub fn character_for(&self, pattern: &Pattern) -> Option<char> {
        self.by_pattern
            .get(pattern)
            .map(|&i| self.entries[i].character)
    }

    pub fn decode_signals(&self, signals: &[Signal]) -> Option<char> {
        self.character_for(&Pattern::from_signals(signals))
    }

    /// Decodes a `.`/`-` string. Anything unparseable is simply absent.
    pub fn decode(&self, code: &str) -> Option<char> {
        code.parse::<Pattern>()
            .ok()
            .and_then(|p| self.character_for(&p))
    }

    /// One slot per input character; `None` where the character is unmapped.
    pub fn encode(&self, text: &str) -> Vec<Option<&AlphabetEntry>> {
        text.chars().map(|ch| self.entry_for(ch)).collect()
    }

    /// Renders text as Morse: letters joined by a space, words by ` / `.
    /// Unmapped characters are dropped.
    pub fn encode_text(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|word| {
                word.chars()
                    .filter_map(|ch| self.symbol_for(ch))
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::new()
    }
}
