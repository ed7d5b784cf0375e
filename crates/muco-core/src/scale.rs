//! Scales: interval patterns over a tonic, spelling and quantization

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TheoryError;
use crate::theory::{tables, Accidental, KeySignature, Mode, NoteName, PitchClass};

/// Scale/mode types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleKind {
    Major,
    Minor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
    HarmonicMinor,
    MelodicMinor,
    Pentatonic,
    Blues,
    Chromatic,
}

impl ScaleKind {
    pub const ALL: [ScaleKind; 12] = [
        Self::Major,
        Self::Minor,
        Self::Dorian,
        Self::Phrygian,
        Self::Lydian,
        Self::Mixolydian,
        Self::Locrian,
        Self::HarmonicMinor,
        Self::MelodicMinor,
        Self::Pentatonic,
        Self::Blues,
        Self::Chromatic,
    ];

    /// Scale intervals (semitones from tonic)
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            Self::Major => Mode::Major.intervals(),
            Self::Minor => Mode::Minor.intervals(),
            Self::Dorian => Mode::Dorian.intervals(),
            Self::Phrygian => Mode::Phrygian.intervals(),
            Self::Lydian => Mode::Lydian.intervals(),
            Self::Mixolydian => Mode::Mixolydian.intervals(),
            Self::Locrian => Mode::Locrian.intervals(),
            Self::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            Self::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            Self::Pentatonic => &[0, 2, 4, 7, 9],
            Self::Blues => &[0, 3, 5, 6, 7, 10],
            Self::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }

    /// Step pattern between consecutive degrees, closing the octave (sums to 12)
    pub fn steps(&self) -> Vec<u8> {
        let intervals = self.intervals();
        intervals
            .iter()
            .zip(intervals.iter().skip(1).chain(std::iter::once(&12)))
            .map(|(a, b)| b - a)
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Major => "Major",
            Self::Minor => "Minor",
            Self::Dorian => "Dorian",
            Self::Phrygian => "Phrygian",
            Self::Lydian => "Lydian",
            Self::Mixolydian => "Mixolydian",
            Self::Locrian => "Locrian",
            Self::HarmonicMinor => "Harmonic Minor",
            Self::MelodicMinor => "Melodic Minor",
            Self::Pentatonic => "Pentatonic",
            Self::Blues => "Blues",
            Self::Chromatic => "Chromatic",
        }
    }

    /// One letter per degree
    pub fn is_heptatonic(&self) -> bool {
        self.intervals().len() == 7
    }
}

impl From<Mode> for ScaleKind {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Major => Self::Major,
            Mode::Minor => Self::Minor,
            Mode::Dorian => Self::Dorian,
            Mode::Phrygian => Self::Phrygian,
            Mode::Lydian => Self::Lydian,
            Mode::Mixolydian => Self::Mixolydian,
            Mode::Locrian => Self::Locrian,
        }
    }
}

impl FromStr for ScaleKind {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "harmonic minor" => return Ok(Self::HarmonicMinor),
            "melodic minor" => return Ok(Self::MelodicMinor),
            "pentatonic" => return Ok(Self::Pentatonic),
            "blues" => return Ok(Self::Blues),
            "chromatic" => return Ok(Self::Chromatic),
            _ => {}
        }
        s.parse::<Mode>().map(Self::from)
    }
}

/// A scale kind rooted on a spelled tonic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pub tonic: NoteName,
    pub kind: ScaleKind,
}

impl Scale {
    pub fn new(tonic: NoteName, kind: ScaleKind) -> Self {
        Self { tonic, kind }
    }

    /// Scale built on a key's tonic and mode
    pub fn of_key(key: &KeySignature) -> Self {
        Self::new(key.tonic(), key.mode().into())
    }

    pub fn pitch_classes(&self) -> Vec<PitchClass> {
        let tonic = self.tonic.pitch_class();
        self.kind
            .intervals()
            .iter()
            .map(|&i| tonic.transpose(i as i32))
            .collect()
    }

    /// Key whose spellings guide non-heptatonic scales
    fn spelling_key(&self) -> KeySignature {
        match self.kind {
            ScaleKind::Major => KeySignature::major(self.tonic),
            ScaleKind::Minor | ScaleKind::HarmonicMinor | ScaleKind::MelodicMinor | ScaleKind::Blues => {
                KeySignature::minor(self.tonic)
            }
            ScaleKind::Dorian => KeySignature::new(self.tonic, Mode::Dorian),
            ScaleKind::Phrygian => KeySignature::new(self.tonic, Mode::Phrygian),
            ScaleKind::Lydian => KeySignature::new(self.tonic, Mode::Lydian),
            ScaleKind::Mixolydian => KeySignature::new(self.tonic, Mode::Mixolydian),
            ScaleKind::Locrian => KeySignature::new(self.tonic, Mode::Locrian),
            ScaleKind::Pentatonic | ScaleKind::Chromatic => KeySignature::major(self.tonic),
        }
    }

    /// Spelled degrees. Heptatonic scales use each letter exactly once.
    pub fn notes(&self) -> Vec<NoteName> {
        let tonic_pc = self.tonic.pitch_class().value() as i32;
        let key = self.spelling_key();

        self.kind
            .intervals()
            .iter()
            .enumerate()
            .map(|(degree, &interval)| {
                let target = tonic_pc + interval as i32;
                if self.kind.is_heptatonic() {
                    let letter = self.tonic.letter.step(degree as i32);
                    let mut offset = (target - letter.semitone()).rem_euclid(12);
                    if offset > 6 {
                        offset -= 12;
                    }
                    if let Some(accidental) = Accidental::from_offset(offset) {
                        return NoteName::new(letter, accidental);
                    }
                }
                tables()
                    .spellings_of(PitchClass::new(target), Some(&key))
                    .into_iter()
                    .next()
                    .unwrap_or(self.tonic)
            })
            .collect()
    }

    pub fn contains(&self, pc: PitchClass) -> bool {
        self.pitch_classes().contains(&pc)
    }

    /// Zero-based degree of a pitch class
    pub fn degree_of(&self, pc: PitchClass) -> Option<usize> {
        self.pitch_classes().iter().position(|&p| p == pc)
    }

    /// Snap a MIDI note to the nearest scale degree (the lower candidate wins ties).
    ///
    /// The note moves by the signed distance to that degree, so snapping across
    /// an octave boundary lands in the neighbouring octave.
    pub fn quantize(&self, note: u8) -> u8 {
        let relative = (note as i32 - self.tonic.pitch_class().value() as i32).rem_euclid(12);

        let mut best: Option<i32> = None;
        for &interval in self.kind.intervals() {
            let mut offset = (interval as i32 - relative).rem_euclid(12);
            if offset > 6 {
                offset -= 12;
            }
            let candidate = note as i32 + offset;
            if !(0..=127).contains(&candidate) {
                continue;
            }
            let closer = match best {
                None => true,
                Some(b) => {
                    let (d, bd) = (offset.abs(), (b - note as i32).abs());
                    d < bd || (d == bd && candidate < b)
                }
            };
            if closer {
                best = Some(candidate);
            }
        }

        best.map_or(note, |n| n as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale(tonic: &str, kind: ScaleKind) -> Scale {
        Scale::new(tonic.parse().unwrap(), kind)
    }

    fn spelled(s: &Scale) -> Vec<String> {
        s.notes().iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_steps_sum_to_octave() {
        for kind in ScaleKind::ALL {
            let total: u32 = kind.steps().iter().map(|&s| s as u32).sum();
            assert_eq!(total, 12, "{}", kind.name());
        }
        assert_eq!(ScaleKind::Major.steps(), vec![2, 2, 1, 2, 2, 2, 1]);
    }

    #[test]
    fn test_heptatonic_spelling() {
        assert_eq!(spelled(&scale("D", ScaleKind::Major)), ["D", "E", "F#", "G", "A", "B", "C#"]);
        assert_eq!(spelled(&scale("F", ScaleKind::Major)), ["F", "G", "A", "Bb", "C", "D", "E"]);
        assert_eq!(spelled(&scale("C", ScaleKind::HarmonicMinor)), ["C", "D", "Eb", "F", "G", "Ab", "B"]);
        assert_eq!(spelled(&scale("G#", ScaleKind::Major)), ["G#", "A#", "B#", "C#", "D#", "E#", "Fx"]);
    }

    #[test]
    fn test_pentatonic_spelling() {
        assert_eq!(spelled(&scale("Eb", ScaleKind::Pentatonic)), ["Eb", "F", "G", "Bb", "C"]);
    }

    #[test]
    fn test_contains() {
        let c_major = scale("C", ScaleKind::Major);
        assert!(c_major.contains(PitchClass::new(4)));
        assert!(!c_major.contains(PitchClass::new(6)));
        assert_eq!(c_major.degree_of(PitchClass::new(7)), Some(4));
    }

    #[test]
    fn test_quantize() {
        // When equidistant, the first scale degree found wins
        let c_major = scale("C", ScaleKind::Major);
        assert_eq!(c_major.quantize(61), 60);
        assert_eq!(c_major.quantize(63), 62);
        assert_eq!(c_major.quantize(66), 65);
        assert_eq!(c_major.quantize(60), 60);
        assert_eq!(c_major.quantize(64), 64);
    }

    #[test]
    fn test_quantize_other_tonic() {
        // A major: C4 sits between B3 and C#4
        let a_major = scale("A", ScaleKind::Major);
        assert_eq!(a_major.quantize(60), 59);
        assert_eq!(a_major.quantize(61), 61);
        assert_eq!(a_major.quantize(70), 69);
        for note in 0..=127u8 {
            let snapped = a_major.quantize(note);
            assert!((snapped as i32 - note as i32).abs() <= 1, "{note} -> {snapped}");
            assert!(a_major.contains(PitchClass::new(snapped as i32)));
        }
    }

    #[test]
    fn test_quantize_wraps_into_next_octave() {
        // B4 in C pentatonic is one step below C5, not eleven above C4
        let pentatonic = scale("C", ScaleKind::Pentatonic);
        assert_eq!(pentatonic.quantize(71), 72);
        assert_eq!(pentatonic.quantize(70), 69);
        assert_eq!(pentatonic.quantize(127), 127);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("harmonic-minor".parse::<ScaleKind>().unwrap(), ScaleKind::HarmonicMinor);
        assert_eq!("dorian".parse::<ScaleKind>().unwrap(), ScaleKind::Dorian);
        assert_eq!("m".parse::<ScaleKind>().unwrap(), ScaleKind::Minor);
        assert!("bebop".parse::<ScaleKind>().is_err());
    }
}
