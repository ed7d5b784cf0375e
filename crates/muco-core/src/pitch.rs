//! Pitch resolution (spelled note + key context -> semitone index and frequency)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TheoryError;
use crate::theory::{tables, Accidental, KeySignature, Letter, NoteName, PitchClass, MAX_OCTAVE, MIN_OCTAVE};

/// Concert pitch reference
pub const A4_FREQUENCY: f64 = 440.0;
/// Semitone index (and MIDI note number) of A4
pub const A4_INDEX: i32 = 69;

/// Letter, optional accidental and octave as written in a score.
///
/// `accidental == None` means the key signature decides; `Some(Natural)` is an
/// explicit natural that overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpelledNote {
    pub letter: Letter,
    pub accidental: Option<Accidental>,
    pub octave: i32,
}

impl SpelledNote {
    pub fn new(letter: Letter, accidental: Option<Accidental>, octave: i32) -> Self {
        Self {
            letter,
            accidental,
            octave,
        }
    }

    /// Note with an explicit accidental
    pub fn spelled(name: NoteName, octave: i32) -> Self {
        Self::new(name.letter, Some(name.accidental), octave)
    }

    /// Letter/accidental after applying the key to an implicit accidental
    pub fn name_in(&self, key: Option<&KeySignature>) -> NoteName {
        let accidental = match (self.accidental, key) {
            (Some(a), _) => a,
            (None, Some(k)) => k.accidental_for(self.letter),
            (None, None) => Accidental::Natural,
        };
        NoteName::new(self.letter, accidental)
    }

    /// MIDI note number, reading an implicit accidental as natural.
    ///
    /// MIDI numbering reaches down to octave -1 (note 0 is `C-1`), below the
    /// range scores may use.
    pub fn to_midi(&self) -> Result<u8, TheoryError> {
        let name = self.name_in(None);
        let index = 12 * (self.octave + 1) + name.letter.semitone() + name.accidental.offset();
        u8::try_from(index)
            .ok()
            .filter(|n| *n <= 127)
            .ok_or(TheoryError::InvalidMidiNote(index))
    }

    /// Spell a MIDI note number with the default (sharp) policy
    pub fn from_midi(note: i32) -> Result<Self, TheoryError> {
        if !(0..=127).contains(&note) {
            return Err(TheoryError::InvalidMidiNote(note));
        }
        let (name, octave) = PitchResolver::new(None).choose_spelling(note, false);
        Ok(Self::spelled(name, octave))
    }
}

/// Naturals print bare (`C4`). The alternate form (`{:#}`) keeps an explicit
/// natural as `n`, which is how a score overrides its key.
impl fmt::Display for SpelledNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accidental = match self.accidental {
            None => "",
            Some(Accidental::Natural) if f.alternate() => "n",
            Some(a) => a.symbol(),
        };
        write!(f, "{}{}{}", self.letter, accidental, self.octave)
    }
}

impl FromStr for SpelledNote {
    type Err = TheoryError;

    /// Parses `A4`, `C#4`, `Bb3`, `En5`, `C-1`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let first = chars.next().ok_or(TheoryError::InvalidLetter(' '))?;
        let letter = Letter::from_char(first)?;
        let rest = chars.as_str();
        let digits_at = rest
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .ok_or_else(|| TheoryError::UnknownAccidental(rest.to_string()))?;
        let (symbol, octave) = rest.split_at(digits_at);
        let octave: i32 = octave
            .parse()
            .map_err(|_| TheoryError::UnknownAccidental(rest.to_string()))?;
        let accidental = if symbol.is_empty() {
            None
        } else {
            Some(Accidental::from_symbol(symbol)?)
        };
        Ok(Self::new(letter, accidental, octave))
    }
}

/// Result of resolving a spelled note
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPitch {
    pub pitch_class: PitchClass,
    /// 12 × (octave + 1) + letter + accidental (A4 = 69)
    pub semitone: i32,
    pub frequency: f64,
}

/// Equal-tempered frequency of a semitone index
pub fn frequency_of(semitone: i32) -> f64 {
    A4_FREQUENCY * 2f64.powf((semitone - A4_INDEX) as f64 / 12.0)
}

fn check_octave(octave: i32) -> Result<(), TheoryError> {
    if (MIN_OCTAVE..=MAX_OCTAVE).contains(&octave) {
        Ok(())
    } else {
        Err(TheoryError::OutOfRange(octave))
    }
}

/// Resolves spelled notes under an optional key signature
#[derive(Debug, Clone, Copy, Default)]
pub struct PitchResolver {
    key: Option<KeySignature>,
}

impl PitchResolver {
    pub fn new(key: Option<KeySignature>) -> Self {
        Self { key }
    }

    pub fn key(&self) -> Option<&KeySignature> {
        self.key.as_ref()
    }

    pub fn resolve(&self, note: &SpelledNote) -> Result<ResolvedPitch, TheoryError> {
        check_octave(note.octave)?;
        let name = note.name_in(self.key.as_ref());
        let semitone = 12 * (note.octave + 1) + name.letter.semitone() + name.accidental.offset();
        // Cb0 and B#10 cross the octave boundary
        check_octave(semitone.div_euclid(12) - 1)?;

        Ok(ResolvedPitch {
            pitch_class: name.pitch_class(),
            semitone,
            frequency: frequency_of(semitone),
        })
    }

    /// Spell a semitone index, preferring the key's spelling and then sharps
    pub fn spell(&self, semitone: i32) -> Result<SpelledNote, TheoryError> {
        self.spell_toward(semitone, false)
    }

    /// Like [`PitchResolver::spell`], but falls back to flats when `flats` is set
    pub fn spell_toward(&self, semitone: i32, flats: bool) -> Result<SpelledNote, TheoryError> {
        check_octave(semitone.div_euclid(12) - 1)?;
        let (name, octave) = self.choose_spelling(semitone, flats);
        check_octave(octave)?;
        Ok(SpelledNote::spelled(name, octave))
    }

    fn choose_spelling(&self, semitone: i32, flats: bool) -> (NoteName, i32) {
        let pc = PitchClass::new(semitone);
        let spellings = tables().spellings_of(pc, self.key.as_ref());
        let in_key = self.key.and_then(|k| spellings.iter().copied().find(|n| k.contains(*n)));
        let name = in_key
            .or_else(|| {
                spellings
                    .iter()
                    .copied()
                    .find(|n| if flats { n.accidental.offset() <= 0 } else { n.accidental.offset() >= 0 })
            })
            .or_else(|| spellings.first().copied())
            .unwrap_or(NoteName::natural(Letter::C));
        let base = name.letter.semitone() + name.accidental.offset();
        (name, (semitone - base).div_euclid(12) - 1)
    }
}
