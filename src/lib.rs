//! Morse code tap trainer core.
//!
//! Everything time-dependent takes an explicit `Instant`, so a driver owns the
//! clock and tests can run on virtual time. The terminal front end lives in
//! the binary.

pub mod config;
pub mod engine;
pub mod feedback;
pub mod generator;
pub mod session;
pub mod stats;
