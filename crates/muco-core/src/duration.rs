//! Symbolic durations and their resolution to seconds

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TheoryError;

/// Most dots a duration may carry
pub const MAX_DOTS: u8 = 2;

/// Base note values (power-of-two fractions of a whole note)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationValue {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
}

impl DurationValue {
    pub const ALL: [DurationValue; 7] = [
        Self::Whole,
        Self::Half,
        Self::Quarter,
        Self::Eighth,
        Self::Sixteenth,
        Self::ThirtySecond,
        Self::SixtyFourth,
    ];

    /// Length in quarter notes
    pub fn quarters(self) -> f64 {
        match self {
            Self::Whole => 4.0,
            Self::Half => 2.0,
            Self::Quarter => 1.0,
            Self::Eighth => 0.5,
            Self::Sixteenth => 0.25,
            Self::ThirtySecond => 0.125,
            Self::SixtyFourth => 0.0625,
        }
    }

    /// Fraction of a whole note
    pub fn fraction(self) -> f64 {
        self.quarters() / 4.0
    }

    pub fn from_fraction(fraction: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.fraction() == fraction)
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Whole => 'w',
            Self::Half => 'h',
            Self::Quarter => 'q',
            Self::Eighth => 'e',
            Self::Sixteenth => 's',
            Self::ThirtySecond => 't',
            Self::SixtyFourth => 'x',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.symbol() == symbol)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Whole => "whole",
            Self::Half => "half",
            Self::Quarter => "quarter",
            Self::Eighth => "eighth",
            Self::Sixteenth => "sixteenth",
            Self::ThirtySecond => "thirty-second",
            Self::SixtyFourth => "sixty-fourth",
        }
    }
}

impl fmt::Display for DurationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DurationValue {
    type Err = TheoryError;

    /// Accepts symbols (`q`), names (`quarter`) and constant-style names (`QUARTER_NOTE`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Self::from_symbol(c).ok_or_else(|| TheoryError::UnresolvableDuration(s.to_string()));
        }

        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let normalized = normalized.strip_suffix("-note").unwrap_or(&normalized);
        Self::ALL
            .into_iter()
            .find(|v| v.name() == normalized)
            .ok_or_else(|| TheoryError::UnresolvableDuration(s.to_string()))
    }
}

/// A base value with dots and an optional tie to the next event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duration {
    pub value: DurationValue,
    pub dots: u8,
    pub tied: bool,
}

impl Duration {
    pub fn new(value: DurationValue) -> Self {
        Self {
            value,
            dots: 0,
            tied: false,
        }
    }

    pub fn dotted(value: DurationValue, dots: u8) -> Self {
        Self {
            value,
            dots,
            tied: false,
        }
    }

    pub fn with_tie(mut self, tied: bool) -> Self {
        self.tied = tied;
        self
    }

    /// Length in quarter notes, dots included (one dot ×1.5, two ×1.75)
    pub fn quarters(&self) -> f64 {
        self.value.quarters() * (2.0 - 0.5f64.powi(self.dots as i32))
    }

    /// Same rhythmic value, ignoring the tie flag
    pub fn same_value(&self, other: &Duration) -> bool {
        self.value == other.value && self.dots == other.dots
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::new(DurationValue::Quarter)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value.symbol())?;
        for _ in 0..self.dots {
            f.write_str(".")?;
        }
        if self.tied {
            f.write_str("~")?;
        }
        Ok(())
    }
}

impl FromStr for Duration {
    type Err = TheoryError;

    /// Parses `q`, `h.`, `e..~` and plain names like `quarter`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unresolvable = || TheoryError::UnresolvableDuration(s.to_string());
        let (body, tied) = match s.strip_suffix('~') {
            Some(body) => (body, true),
            None => (s, false),
        };
        let base = body.trim_end_matches('.');
        let dots = body.len() - base.len();
        if dots > MAX_DOTS as usize {
            return Err(unresolvable());
        }
        let value: DurationValue = base.parse().map_err(|_| unresolvable())?;
        Ok(Self::dotted(value, dots as u8).with_tie(tied))
    }
}

/// Converts durations to seconds under a tempo and beat unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationResolver {
    tempo: f64,
    beat_unit: Duration,
}

impl DurationResolver {
    pub fn new(tempo: f64, beat_unit: Duration) -> Result<Self, TheoryError> {
        if !tempo.is_finite() || tempo <= 0.0 {
            return Err(TheoryError::NonPositiveTempo(tempo));
        }
        Ok(Self { tempo, beat_unit })
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    pub fn beat_unit(&self) -> Duration {
        self.beat_unit
    }

    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.tempo
    }

    pub fn seconds(&self, duration: &Duration) -> f64 {
        self.seconds_per_beat() * duration.quarters() / self.beat_unit.quarters()
    }

    /// Continuous span of a chain of tied segments
    pub fn seconds_tied(&self, segments: &[Duration]) -> f64 {
        segments.iter().map(|d| self.seconds(d)).sum()
    }
}

impl Default for DurationResolver {
    fn default() -> Self {
        Self {
            tempo: 120.0,
            beat_unit: Duration::default(),
        }
    }
}
