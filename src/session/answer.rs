use crate::engine::alphabet::Alphabet;

/// Answer in progress: free text for text modes, decoded tap symbols for
/// code-input modes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnswerBuffer {
    typed: String,
    symbols: Vec<char>,
}

impl AnswerBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.typed.clear();
        self.symbols.clear();
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn type_char(&mut self, ch: char) {
        self.typed.push(ch);
    }

    pub fn set_typed(&mut self, text: &str) {
        self.typed = text.to_string();
    }

    pub fn pop_typed(&mut self) -> Option<char> {
        self.typed.pop()
    }

    pub fn push_symbol(&mut self, ch: char) {
        self.symbols.push(ch);
    }

    /// Word separator between tapped symbols.
    pub fn push_space(&mut self) {
        self.symbols.push(' ');
    }

    pub fn pop_symbol(&mut self) -> Option<char> {
        self.symbols.pop()
    }

    pub fn symbols_text(&self) -> String {
        self.symbols.iter().collect()
    }

    /// Tapped symbols rendered back to Morse for validation.
    pub fn encoded(&self, alphabet: &Alphabet) -> String {
        alphabet.encode_text(&self.symbols_text())
    }
}
