//! Intervals and chords over spelled notes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TheoryError;
use crate::pitch::{PitchResolver, SpelledNote};
use crate::theory::{Accidental, KeySignature, NoteName, MAX_OCTAVE, MIN_OCTAVE};

// ============================================================================
// Intervals
// ============================================================================

/// Named intervals from unison to double octave, one per semitone count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Interval {
    Unison,
    MinorSecond,
    MajorSecond,
    MinorThird,
    MajorThird,
    PerfectFourth,
    Tritone,
    PerfectFifth,
    MinorSixth,
    MajorSixth,
    MinorSeventh,
    MajorSeventh,
    Octave,
    MinorNinth,
    MajorNinth,
    MinorTenth,
    MajorTenth,
    PerfectEleventh,
    AugmentedEleventh,
    PerfectTwelfth,
    MinorThirteenth,
    MajorThirteenth,
    MinorFourteenth,
    MajorFourteenth,
    DoubleOctave,
}

/// Direction of a transposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Interval {
    pub const ALL: [Interval; 25] = [
        Self::Unison,
        Self::MinorSecond,
        Self::MajorSecond,
        Self::MinorThird,
        Self::MajorThird,
        Self::PerfectFourth,
        Self::Tritone,
        Self::PerfectFifth,
        Self::MinorSixth,
        Self::MajorSixth,
        Self::MinorSeventh,
        Self::MajorSeventh,
        Self::Octave,
        Self::MinorNinth,
        Self::MajorNinth,
        Self::MinorTenth,
        Self::MajorTenth,
        Self::PerfectEleventh,
        Self::AugmentedEleventh,
        Self::PerfectTwelfth,
        Self::MinorThirteenth,
        Self::MajorThirteenth,
        Self::MinorFourteenth,
        Self::MajorFourteenth,
        Self::DoubleOctave,
    ];

    pub fn semitones(self) -> u8 {
        self as u8
    }

    /// Interval spanning `semitones`; wider spans fold down by octaves
    pub fn from_semitones(semitones: u32) -> Self {
        let mut s = semitones;
        while s > 24 {
            s -= 12;
        }
        Self::ALL[s as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Unison => "unison",
            Self::MinorSecond => "minor second",
            Self::MajorSecond => "major second",
            Self::MinorThird => "minor third",
            Self::MajorThird => "major third",
            Self::PerfectFourth => "perfect fourth",
            Self::Tritone => "tritone",
            Self::PerfectFifth => "perfect fifth",
            Self::MinorSixth => "minor sixth",
            Self::MajorSixth => "major sixth",
            Self::MinorSeventh => "minor seventh",
            Self::MajorSeventh => "major seventh",
            Self::Octave => "octave",
            Self::MinorNinth => "minor ninth",
            Self::MajorNinth => "major ninth",
            Self::MinorTenth => "minor tenth",
            Self::MajorTenth => "major tenth",
            Self::PerfectEleventh => "perfect eleventh",
            Self::AugmentedEleventh => "augmented eleventh",
            Self::PerfectTwelfth => "perfect twelfth",
            Self::MinorThirteenth => "minor thirteenth",
            Self::MajorThirteenth => "major thirteenth",
            Self::MinorFourteenth => "minor fourteenth",
            Self::MajorFourteenth => "major fourteenth",
            Self::DoubleOctave => "double octave",
        }
    }

    /// Distance between two notes (implicit accidentals read as natural)
    pub fn between(a: &SpelledNote, b: &SpelledNote) -> Result<Self, TheoryError> {
        let resolver = PitchResolver::default();
        let a = resolver.resolve(a)?.semitone;
        let b = resolver.resolve(b)?.semitone;
        Ok(Self::from_semitones(a.abs_diff(b)))
    }

    /// Inversion within the octave (unison and octave swap)
    pub fn inversion(self) -> Self {
        let s = self.semitones();
        match (s, s % 12) {
            (0, _) => Self::Octave,
            (_, 0) => Self::Unison,
            (_, simple) => Self::from_semitones(12 - simple as u32),
        }
    }

    /// Move a note by this interval.
    ///
    /// With a key the result takes the key's spelling; otherwise it follows the
    /// source's accidental direction (flat sources give flat results).
    pub fn transpose(
        self,
        note: &SpelledNote,
        direction: Direction,
        key: Option<&KeySignature>,
    ) -> Result<SpelledNote, TheoryError> {
        let resolver = PitchResolver::new(key.copied());
        let source = resolver.resolve(note)?.semitone;
        let shift = self.semitones() as i32;
        let target = match direction {
            Direction::Up => source + shift,
            Direction::Down => source - shift,
        };
        let flats = note.name_in(key).accidental.offset() < 0;
        resolver.spell_toward(target, flats)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Interval {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace(['_', '-'], " ");
        let alias = match normalized.as_str() {
            "augmented fourth" | "diminished fifth" => Some(Self::Tritone),
            "diminished twelfth" => Some(Self::AugmentedEleventh),
            "perfect octave" => Some(Self::Octave),
            _ => None,
        };
        alias
            .or_else(|| Self::ALL.into_iter().find(|i| i.name() == normalized))
            .ok_or_else(|| TheoryError::UnknownName(s.to_string()))
    }
}

// ============================================================================
// Chords
// ============================================================================

/// Chord quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Major7,
    Minor7,
    Dominant7,
    Diminished7,
    HalfDiminished7,
    Sus2,
    Sus4,
    Add9,
}

impl ChordQuality {
    /// Get chord intervals from root
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            Self::Major => &[0, 4, 7],
            Self::Minor => &[0, 3, 7],
            Self::Diminished => &[0, 3, 6],
            Self::Augmented => &[0, 4, 8],
            Self::Major7 => &[0, 4, 7, 11],
            Self::Minor7 => &[0, 3, 7, 10],
            Self::Dominant7 => &[0, 4, 7, 10],
            Self::Diminished7 => &[0, 3, 6, 9],
            Self::HalfDiminished7 => &[0, 3, 6, 10],
            Self::Sus2 => &[0, 2, 7],
            Self::Sus4 => &[0, 5, 7],
            Self::Add9 => &[0, 4, 7, 14],
        }
    }

    /// Letter steps above the root for each chord tone
    fn degrees(&self) -> &'static [i32] {
        match self {
            Self::Major | Self::Minor | Self::Diminished | Self::Augmented => &[0, 2, 4],
            Self::Major7 | Self::Minor7 | Self::Dominant7 | Self::Diminished7 | Self::HalfDiminished7 => {
                &[0, 2, 4, 6]
            }
            Self::Sus2 => &[0, 1, 4],
            Self::Sus4 => &[0, 3, 4],
            Self::Add9 => &[0, 2, 4, 8],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Major => "Major",
            Self::Minor => "Minor",
            Self::Diminished => "Dim",
            Self::Augmented => "Aug",
            Self::Major7 => "Maj7",
            Self::Minor7 => "Min7",
            Self::Dominant7 => "Dom7",
            Self::Diminished7 => "Dim7",
            Self::HalfDiminished7 => "m7b5",
            Self::Sus2 => "Sus2",
            Self::Sus4 => "Sus4",
            Self::Add9 => "Add9",
        }
    }
}

impl FromStr for ChordQuality {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "major" | "maj" => Ok(Self::Major),
            "minor" | "min" => Ok(Self::Minor),
            "dim" | "diminished" => Ok(Self::Diminished),
            "aug" | "augmented" => Ok(Self::Augmented),
            "maj7" => Ok(Self::Major7),
            "min7" | "m7" => Ok(Self::Minor7),
            "dom7" | "7" => Ok(Self::Dominant7),
            "dim7" => Ok(Self::Diminished7),
            "half-dim" | "half-diminished" | "m7b5" => Ok(Self::HalfDiminished7),
            "sus2" => Ok(Self::Sus2),
            "sus4" => Ok(Self::Sus4),
            "add9" => Ok(Self::Add9),
            _ => Err(TheoryError::UnknownName(s.to_string())),
        }
    }
}

/// Spelled chord tones over `root`, lowest first.
///
/// Each tone takes its own letter (C E G, Eb G Bb, B D F Ab). `inversion`
/// rotates the lowest tone up an octave that many times.
pub fn chord_notes(
    root: &SpelledNote,
    quality: ChordQuality,
    inversion: usize,
    key: Option<&KeySignature>,
) -> Result<Vec<SpelledNote>, TheoryError> {
    let resolver = PitchResolver::new(key.copied());
    let root_semitone = resolver.resolve(root)?.semitone;
    let root_name = root.name_in(key);
    let flats = root_name.accidental.offset() < 0;

    let mut notes = quality
        .intervals()
        .iter()
        .zip(quality.degrees())
        .map(|(&interval, &degree)| {
            let target = root_semitone + interval as i32;
            let letter = root_name.letter.step(degree);
            let mut offset = (target - letter.semitone()).rem_euclid(12);
            if offset > 6 {
                offset -= 12;
            }
            match Accidental::from_offset(offset) {
                Some(accidental) => {
                    let octave = (target - letter.semitone() - offset).div_euclid(12) - 1;
                    if (MIN_OCTAVE..=MAX_OCTAVE).contains(&octave) {
                        Ok(SpelledNote::spelled(NoteName::new(letter, accidental), octave))
                    } else {
                        Err(TheoryError::OutOfRange(octave))
                    }
                }
                None => resolver.spell_toward(target, flats),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    for _ in 0..inversion % notes.len() {
        let mut lowest = notes.remove(0);
        lowest.octave += 1;
        if lowest.octave > MAX_OCTAVE {
            return Err(TheoryError::OutOfRange(lowest.octave));
        }
        notes.push(lowest);
    }

    Ok(notes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(s: &str) -> SpelledNote {
        s.parse().unwrap()
    }

    fn names(notes: &[SpelledNote]) -> Vec<String> {
        notes
            .iter()
            .map(|n| format!("{}{}", n.name_in(None), n.octave))
            .collect()
    }

    #[test]
    fn test_interval_between() {
        assert_eq!(Interval::between(&note("C4"), &note("G4")).unwrap(), Interval::PerfectFifth);
        assert_eq!(Interval::between(&note("G4"), &note("C4")).unwrap(), Interval::PerfectFifth);
        assert_eq!(Interval::between(&note("C4"), &note("C6")).unwrap(), Interval::DoubleOctave);
        assert_eq!(Interval::between(&note("C4"), &note("F#5")).unwrap(), Interval::AugmentedEleventh);
    }

    #[test]
    fn test_inversion() {
        assert_eq!(Interval::MajorThird.inversion(), Interval::MinorSixth);
        assert_eq!(Interval::PerfectFifth.inversion(), Interval::PerfectFourth);
        assert_eq!(Interval::Tritone.inversion(), Interval::Tritone);
        assert_eq!(Interval::Unison.inversion(), Interval::Octave);
        assert_eq!(Interval::Octave.inversion(), Interval::Unison);
        assert_eq!(Interval::MajorTenth.inversion(), Interval::MinorSixth);
    }

    #[test]
    fn test_transpose_follows_accidental_direction() {
        let up = Interval::MajorSecond.transpose(&note("Bb3"), Direction::Up, None).unwrap();
        assert_eq!(names(&[up]), ["C4"]);
        let up = Interval::MinorThird.transpose(&note("Eb4"), Direction::Up, None).unwrap();
        assert_eq!(names(&[up]), ["Gb4"]);
        let up = Interval::MinorThird.transpose(&note("D#4"), Direction::Up, None).unwrap();
        assert_eq!(names(&[up]), ["F#4"]);
        let down = Interval::Octave.transpose(&note("A4"), Direction::Down, None).unwrap();
        assert_eq!(down.octave, 3);
    }

    #[test]
    fn test_transpose_uses_key() {
        let d_major: KeySignature = "Dmajor".parse().unwrap();
        let up = Interval::MajorThird
            .transpose(&note("D4"), Direction::Up, Some(&d_major))
            .unwrap();
        assert_eq!(names(&[up]), ["F#4"]);
    }

    #[test]
    fn test_interval_names() {
        assert_eq!("perfect fifth".parse::<Interval>().unwrap(), Interval::PerfectFifth);
        assert_eq!("DIMINISHED_FIFTH".parse::<Interval>().unwrap(), Interval::Tritone);
        assert_eq!(Interval::from_semitones(31), Interval::PerfectTwelfth);
    }

    #[test]
    fn test_chord_notes() {
        let c_major = chord_notes(&note("C4"), ChordQuality::Major, 0, None).unwrap();
        assert_eq!(names(&c_major), ["C4", "E4", "G4"]);

        let c_minor = chord_notes(&note("C4"), ChordQuality::Minor, 0, None).unwrap();
        assert_eq!(names(&c_minor), ["C4", "Eb4", "G4"]);

        let b_dim7 = chord_notes(&note("B3"), ChordQuality::Diminished7, 0, None).unwrap();
        assert_eq!(names(&b_dim7), ["B3", "D4", "F4", "Ab4"]);

        let add9 = chord_notes(&note("C4"), ChordQuality::Add9, 0, None).unwrap();
        assert_eq!(names(&add9), ["C4", "E4", "G4", "D5"]);
    }

    #[test]
    fn test_chord_inversions() {
        let first = chord_notes(&note("C4"), ChordQuality::Major, 1, None).unwrap();
        assert_eq!(names(&first), ["E4", "G4", "C5"]);
        let second = chord_notes(&note("C4"), ChordQuality::Major, 2, None).unwrap();
        assert_eq!(names(&second), ["G4", "C5", "E5"]);
    }

    #[test]
    fn test_chord_root_from_key() {
        let f_major: KeySignature = "Fmajor".parse().unwrap();
        let chord = chord_notes(&note("B3"), ChordQuality::Major, 0, Some(&f_major)).unwrap();
        assert_eq!(names(&chord), ["Bb3", "D4", "F4"]);
    }
}
