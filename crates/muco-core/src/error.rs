//! Error types for muco

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::theory::{MAX_OCTAVE, MIN_OCTAVE};

/// Source location inside notation text (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Music-theory resolution failures (pitch, octave, duration, tempo, key)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TheoryError {
    #[error("Invalid letter: {0:?}")]
    InvalidLetter(char),
    #[error("Unknown accidental: {0:?}")]
    UnknownAccidental(String),
    #[error("Octave {0} outside supported range {min}..={max}", min = MIN_OCTAVE, max = MAX_OCTAVE)]
    OutOfRange(i32),
    #[error("Tempo must be positive, got {0}")]
    NonPositiveTempo(f64),
    #[error("Unresolvable duration: {0:?}")]
    UnresolvableDuration(String),
    #[error("Unknown mode: {0:?}")]
    UnknownMode(String),
    #[error("Unknown interval or chord name: {0:?}")]
    UnknownName(String),
    #[error("Velocity must lie in 0..=1, got {0}")]
    InvalidVelocity(f32),
    #[error("MIDI note {0} outside 0..=127")]
    InvalidMidiNote(i32),
    #[error("Tie has no following event")]
    DanglingTie,
    #[error("Tied events do not share the same pitches")]
    TieMismatch,
}

#[derive(Debug, Error)]
pub enum MucoError {
    #[error("Syntax error at {position}: {message}")]
    Syntax { position: Position, message: String },
    #[error("Semantic error in event {event}: {source}")]
    Semantic {
        event: usize,
        #[source]
        source: TheoryError,
    },
    #[error("Theory error: {0}")]
    Theory(#[from] TheoryError),
}

impl MucoError {
    pub fn syntax(position: Position, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Source position for syntax errors
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Syntax { position, .. } => Some(*position),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MucoError>;
