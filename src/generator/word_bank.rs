use crate::session::exercise::Difficulty;

pub const FALLBACK_WORD: &str = "MORSE";
pub const FALLBACK_SENTENCE: &str = "HELLO WORLD";

const EASY_WORDS: &[&str] = &[
    "CAT", "DOG", "SUN", "RUN", "HI", "GO", "NO", "UP", "ME", "IT", "IS", "AT", "AN", "TO", "SO",
    "ON", "BE", "WE", "HE", "OR", "AS", "IF", "DO", "MY", "OK", "AM", "IN", "OF", "BY", "US",
    "AX", "OX",
];

const MEDIUM_WORDS: &[&str] = &[
    "HELLO", "WORLD", "MORSE", "CODE", "LEARN", "RADIO", "SIGNAL", "DOT", "DASH", "ALPHA",
    "BRAVO", "DELTA", "ECHO", "GOLF", "HOTEL", "INDIA", "KILO", "LIMA", "MIKE", "OSCAR", "PAPA",
    "ROMEO", "TANGO", "VICTOR", "ZULU", "FOXTROT", "SIERRA", "WHISKEY", "YANKEE",
];

const HARD_WORDS: &[&str] = &[
    "FREQUENCY",
    "TELEGRAPH",
    "WIRELESS",
    "ALPHABET",
    "OPERATOR",
    "EMERGENCY",
    "TRANSMIT",
    "RECEIVER",
    "BROADCAST",
    "COMMUNICATE",
    "WAVELENGTH",
    "MODULATION",
];

const EASY_SENTENCES: &[&str] = &[
    "HI THERE",
    "GOOD DAY",
    "HELP ME",
    "COME IN",
    "GO NOW",
    "YES OR NO",
    "I AM OK",
    "CALL ME",
    "STOP NOW",
    "GO AHEAD",
    "OVER AND OUT",
];

const MEDIUM_SENTENCES: &[&str] = &[
    "HELLO WORLD",
    "MORSE CODE IS FUN",
    "LEARN TO TAP",
    "SEND A MESSAGE",
    "RADIO SIGNAL",
    "COPY THAT",
    "ROGER THAT",
    "STANDING BY",
    "MESSAGE RECEIVED",
    "LOUD AND CLEAR",
    "OVER TO YOU",
];

const HARD_SENTENCES: &[&str] = &[
    "THE QUICK BROWN FOX",
    "EMERGENCY BROADCAST",
    "TRANSMIT ON FREQUENCY",
    "ALPHA BRAVO CHARLIE",
    "REQUEST IMMEDIATE ASSISTANCE",
    "ALL STATIONS COPY",
    "MAYDAY MAYDAY MAYDAY",
    "PAN PAN PAN",
];

/// Each harder tier extends the easier ones.
fn cumulative(tiers: [&'static [&'static str]; 3], difficulty: Difficulty) -> Vec<&'static str> {
    let depth = match difficulty {
        Difficulty::Beginner => 1,
        Difficulty::Intermediate => 2,
        Difficulty::Advanced => 3,
    };
    tiers[..depth].iter().flat_map(|t| t.iter().copied()).collect()
}

pub fn words(difficulty: Difficulty) -> Vec<&'static str> {
    cumulative([EASY_WORDS, MEDIUM_WORDS, HARD_WORDS], difficulty)
}

pub fn sentences(difficulty: Difficulty) -> Vec<&'static str> {
    cumulative([EASY_SENTENCES, MEDIUM_SENTENCES, HARD_SENTENCES], difficulty)
}
