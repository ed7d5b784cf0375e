//! Music-theory reference tables (pitch classes, spellings, key signatures, circle of fifths)

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::TheoryError;

/// Lowest supported octave (scientific pitch notation)
pub const MIN_OCTAVE: i32 = 0;
/// Highest supported octave
pub const MAX_OCTAVE: i32 = 10;

// ============================================================================
// Pitch classes, letters, accidentals
// ============================================================================

/// Semitone within an octave, always reduced modulo 12 (C = 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PitchClass(u8);

impl PitchClass {
    pub fn new(semitone: i32) -> Self {
        Self(semitone.rem_euclid(12) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn transpose(self, semitones: i32) -> Self {
        Self::new(self.0 as i32 + semitones)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", tables().spellings_of(*self, None)[0])
    }
}

/// Natural note letters, ordered from C
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

/// Order in which a key signature adds sharps
const SHARP_ORDER: [Letter; 7] = [Letter::F, Letter::C, Letter::G, Letter::D, Letter::A, Letter::E, Letter::B];

impl Letter {
    pub const ALL: [Letter; 7] = [Letter::C, Letter::D, Letter::E, Letter::F, Letter::G, Letter::A, Letter::B];

    /// Semitone of the natural note above C
    pub fn semitone(self) -> i32 {
        match self {
            Self::C => 0,
            Self::D => 2,
            Self::E => 4,
            Self::F => 5,
            Self::G => 7,
            Self::A => 9,
            Self::B => 11,
        }
    }

    /// Position in C D E F G A B
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(7) as usize]
    }

    /// Letter `steps` diatonic steps away (wraps around the octave)
    pub fn step(self, steps: i32) -> Self {
        Self::from_index(self.index() as i32 + steps)
    }

    pub fn from_char(c: char) -> Result<Self, TheoryError> {
        match c {
            'C' => Ok(Self::C),
            'D' => Ok(Self::D),
            'E' => Ok(Self::E),
            'F' => Ok(Self::F),
            'G' => Ok(Self::G),
            'A' => Ok(Self::A),
            'B' => Ok(Self::B),
            _ => Err(TheoryError::InvalidLetter(c)),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
            Self::F => 'F',
            Self::G => 'G',
            Self::A => 'A',
            Self::B => 'B',
        }
    }

    /// Position on the line of fifths relative to C (F = -1, B = 5)
    fn fifths(self) -> i32 {
        SHARP_ORDER
            .iter()
            .position(|&l| l == self)
            .map_or(0, |p| p as i32 - 1)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Accidentals from double flat to double sharp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Accidental {
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
}

impl Accidental {
    /// Semitone offset applied to the natural letter
    pub fn offset(self) -> i32 {
        match self {
            Self::DoubleFlat => -2,
            Self::Flat => -1,
            Self::Natural => 0,
            Self::Sharp => 1,
            Self::DoubleSharp => 2,
        }
    }

    pub fn from_offset(offset: i32) -> Option<Self> {
        match offset {
            -2 => Some(Self::DoubleFlat),
            -1 => Some(Self::Flat),
            0 => Some(Self::Natural),
            1 => Some(Self::Sharp),
            2 => Some(Self::DoubleSharp),
            _ => None,
        }
    }

    /// ASCII symbol (natural is empty)
    pub fn symbol(self) -> &'static str {
        match self {
            Self::DoubleFlat => "bb",
            Self::Flat => "b",
            Self::Natural => "",
            Self::Sharp => "#",
            Self::DoubleSharp => "x",
        }
    }

    /// Parse an ASCII or Unicode accidental symbol
    pub fn from_symbol(symbol: &str) -> Result<Self, TheoryError> {
        match symbol {
            "bb" | "♭♭" | "𝄫" => Ok(Self::DoubleFlat),
            "b" | "♭" => Ok(Self::Flat),
            "" | "n" | "♮" => Ok(Self::Natural),
            "#" | "♯" => Ok(Self::Sharp),
            "##" | "x" | "♯♯" | "𝄪" => Ok(Self::DoubleSharp),
            _ => Err(TheoryError::UnknownAccidental(symbol.to_string())),
        }
    }

    /// Spelling preference when no key decides (natural, then sharp)
    fn preference(self) -> u8 {
        match self {
            Self::Natural => 0,
            Self::Sharp => 1,
            Self::Flat => 2,
            Self::DoubleSharp => 3,
            Self::DoubleFlat => 4,
        }
    }
}

impl FromStr for Accidental {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s)
    }
}

/// A letter plus accidental, without octave (e.g. `F#`, `Bb`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NoteName {
    pub letter: Letter,
    pub accidental: Accidental,
}

impl NoteName {
    pub fn new(letter: Letter, accidental: Accidental) -> Self {
        Self { letter, accidental }
    }

    pub fn natural(letter: Letter) -> Self {
        Self::new(letter, Accidental::Natural)
    }

    pub fn pitch_class(self) -> PitchClass {
        PitchClass::new(self.letter.semitone() + self.accidental.offset())
    }

    /// Position on the line of fifths (C = 0, G = 1, F = -1, F# = 6, Db = -5)
    pub fn fifths(self) -> i32 {
        self.letter.fifths() + 7 * self.accidental.offset()
    }

    /// Inverse of [`NoteName::fifths`], for positions within double accidentals
    pub fn from_fifths(fifths: i32) -> Option<Self> {
        let shifted = fifths + 1;
        let letter = SHARP_ORDER[shifted.rem_euclid(7) as usize];
        let accidental = Accidental::from_offset(shifted.div_euclid(7))?;
        Some(Self::new(letter, accidental))
    }

    pub fn is_enharmonic(self, other: NoteName) -> bool {
        self.pitch_class() == other.pitch_class()
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.accidental.symbol())
    }
}

impl FromStr for NoteName {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let first = chars.next().ok_or(TheoryError::InvalidLetter(' '))?;
        let letter = Letter::from_char(first)?;
        let accidental = Accidental::from_symbol(chars.as_str())?;
        Ok(Self::new(letter, accidental))
    }
}

// ============================================================================
// Modes and key signatures
// ============================================================================

/// Diatonic modes a key signature can be built on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Major,
    Minor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
}

impl Mode {
    /// Scale intervals (semitones from tonic)
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            Self::Major => &[0, 2, 4, 5, 7, 9, 11],
            Self::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Self::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Self::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            Self::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Self::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            Self::Locrian => &[0, 1, 3, 5, 6, 8, 10],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Dorian => "dorian",
            Self::Phrygian => "phrygian",
            Self::Lydian => "lydian",
            Self::Mixolydian => "mixolydian",
            Self::Locrian => "locrian",
        }
    }

    /// Fifths between this mode's tonic and its relative major tonic
    fn fifths_offset(&self) -> i32 {
        match self {
            Self::Lydian => 1,
            Self::Major => 0,
            Self::Mixolydian => -1,
            Self::Dorian => -2,
            Self::Minor => -3,
            Self::Phrygian => -4,
            Self::Locrian => -5,
        }
    }
}

impl FromStr for Mode {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Single-letter forms are case-sensitive
        match s {
            "" | "M" => return Ok(Self::Major),
            "m" => return Ok(Self::Minor),
            _ => {}
        }
        match s.to_ascii_lowercase().as_str() {
            "major" | "maj" | "ionian" => Ok(Self::Major),
            "minor" | "min" | "aeolian" => Ok(Self::Minor),
            "dorian" => Ok(Self::Dorian),
            "phrygian" => Ok(Self::Phrygian),
            "lydian" => Ok(Self::Lydian),
            "mixolydian" => Ok(Self::Mixolydian),
            "locrian" => Ok(Self::Locrian),
            _ => Err(TheoryError::UnknownMode(s.to_string())),
        }
    }
}

/// Tonic + mode. The accidental set is always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeySignature {
    tonic: NoteName,
    mode: Mode,
}

impl KeySignature {
    pub fn new(tonic: NoteName, mode: Mode) -> Self {
        Self { tonic, mode }
    }

    pub fn major(tonic: NoteName) -> Self {
        Self::new(tonic, Mode::Major)
    }

    pub fn minor(tonic: NoteName) -> Self {
        Self::new(tonic, Mode::Minor)
    }

    pub fn tonic(&self) -> NoteName {
        self.tonic
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tonic_pitch_class(&self) -> PitchClass {
        self.tonic.pitch_class()
    }

    /// Net sharps (positive) or flats (negative) in the signature
    pub fn fifths(&self) -> i32 {
        self.tonic.fifths() + self.mode.fifths_offset()
    }

    /// Accidental the signature applies to `letter` (natural if none)
    pub fn accidental_for(&self, letter: Letter) -> Accidental {
        let fifths = self.fifths();
        let pos = SHARP_ORDER.iter().position(|&l| l == letter).unwrap_or(0) as i32;
        if fifths > 0 {
            // Each pass over the sharp order adds one more sharp to the letter
            let level = if fifths > pos { (fifths - pos - 1) / 7 + 1 } else { 0 };
            Accidental::from_offset(level.min(2)).unwrap_or(Accidental::DoubleSharp)
        } else if fifths < 0 {
            let flat_pos = 6 - pos;
            let level = if -fifths > flat_pos { (-fifths - flat_pos - 1) / 7 + 1 } else { 0 };
            Accidental::from_offset(-level.min(2)).unwrap_or(Accidental::DoubleFlat)
        } else {
            Accidental::Natural
        }
    }

    /// Letters altered by the signature
    pub fn accidentals(&self) -> BTreeMap<Letter, Accidental> {
        tables().accidentals_of(self)
    }

    /// True if `name` is spelled the way this key spells its letter
    pub fn contains(&self, name: NoteName) -> bool {
        self.accidental_for(name.letter) == name.accidental
    }

    /// Signature summary: `"0"`, `"3#"`, `"2b"`
    pub fn summary(&self) -> String {
        match self.fifths() {
            0 => "0".to_string(),
            n if n > 0 => format!("{n}#"),
            n => format!("{}b", -n),
        }
    }

    /// Major key sharing this signature
    pub fn relative_major(&self) -> Option<KeySignature> {
        NoteName::from_fifths(self.fifths()).map(Self::major)
    }

    /// Minor key sharing this signature
    pub fn relative_minor(&self) -> Option<KeySignature> {
        NoteName::from_fifths(self.fifths() + 3).map(Self::minor)
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode.name())
    }
}

impl FromStr for KeySignature {
    type Err = TheoryError;

    /// Parses `Cmajor`, `F#minor`, `Bbm`, `Ddorian`, `Eb`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.char_indices();
        let (_, first) = chars.next().ok_or(TheoryError::InvalidLetter(' '))?;
        let letter = Letter::from_char(first)?;
        let rest = &s[first.len_utf8()..];

        // Longest accidental prefix that leaves a valid mode name
        let split = rest
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(rest.len()))
            .filter(|&i| Accidental::from_symbol(&rest[..i]).is_ok())
            .filter(|&i| rest[i..].parse::<Mode>().is_ok())
            .last();

        match split {
            Some(i) => {
                let accidental = Accidental::from_symbol(&rest[..i])?;
                let mode = rest[i..].parse::<Mode>()?;
                Ok(Self::new(NoteName::new(letter, accidental), mode))
            }
            None => Err(TheoryError::UnknownMode(rest.to_string())),
        }
    }
}

// ============================================================================
// Circle of fifths
// ============================================================================

/// The twelve major keys ordered by ascending fifths, starting at C
#[derive(Debug, Clone)]
pub struct CircleOfFifths {
    keys: [KeySignature; 12],
}

impl CircleOfFifths {
    fn build() -> Self {
        // C G D A E B F# then the flat side Db Ab Eb Bb F
        let keys = std::array::from_fn(|i| {
            let fifths = if i <= 6 { i as i32 } else { i as i32 - 12 };
            let tonic = NoteName::from_fifths(fifths).unwrap_or(NoteName::natural(Letter::C));
            KeySignature::major(tonic)
        });
        Self { keys }
    }

    pub fn keys(&self) -> &[KeySignature; 12] {
        &self.keys
    }

    /// Relative minor of each key, in circle order
    pub fn relative_minors(&self) -> [KeySignature; 12] {
        std::array::from_fn(|i| {
            self.keys[i]
                .relative_minor()
                .unwrap_or(KeySignature::minor(NoteName::natural(Letter::A)))
        })
    }

    /// Slot of a key (any mode) on the circle; enharmonic keys share a slot
    pub fn position(&self, key: &KeySignature) -> usize {
        key.fifths().rem_euclid(12) as usize
    }

    /// Neighbour one fifth up
    pub fn next(&self, index: usize) -> &KeySignature {
        &self.keys[(index + 1) % 12]
    }

    /// Neighbour one fifth down
    pub fn previous(&self, index: usize) -> &KeySignature {
        &self.keys[(index + 11) % 12]
    }

    /// Major key on the circle whose tonic has this pitch class
    pub fn major_for(&self, pc: PitchClass) -> &KeySignature {
        let slot = (pc.value() as usize * 7) % 12;
        &self.keys[slot]
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Process-wide immutable lookup data
#[derive(Debug)]
pub struct TheoryTables {
    pitch_classes: [PitchClass; 12],
    circle: CircleOfFifths,
    /// Every spelling per pitch class, in default preference order
    enharmonics: [Vec<NoteName>; 12],
}

static TABLES: Lazy<TheoryTables> = Lazy::new(TheoryTables::build);

/// Shared theory tables, built on first use
pub fn tables() -> &'static TheoryTables {
    &TABLES
}

impl TheoryTables {
    fn build() -> Self {
        let mut enharmonics: [Vec<NoteName>; 12] = std::array::from_fn(|_| Vec::new());
        let accidentals = [
            Accidental::DoubleFlat,
            Accidental::Flat,
            Accidental::Natural,
            Accidental::Sharp,
            Accidental::DoubleSharp,
        ];
        for letter in Letter::ALL {
            for accidental in accidentals {
                let name = NoteName::new(letter, accidental);
                enharmonics[name.pitch_class().value() as usize].push(name);
            }
        }
        for spellings in &mut enharmonics {
            spellings.sort_by_key(|n| (n.accidental.preference(), n.letter));
        }

        Self {
            pitch_classes: std::array::from_fn(|i| PitchClass::new(i as i32)),
            circle: CircleOfFifths::build(),
            enharmonics,
        }
    }

    pub fn pitch_classes(&self) -> &[PitchClass; 12] {
        &self.pitch_classes
    }

    pub fn circle_of_fifths(&self) -> &CircleOfFifths {
        &self.circle
    }

    pub fn pitch_class_of(&self, letter: char, accidental: Accidental) -> Result<PitchClass, TheoryError> {
        let letter = Letter::from_char(letter)?;
        Ok(NoteName::new(letter, accidental).pitch_class())
    }

    /// Candidate spellings for a pitch class, best first.
    ///
    /// Spellings the preferred key uses come first; the rest follow the default
    /// order natural, sharp, flat, double sharp, double flat.
    pub fn spellings_of(&self, pc: PitchClass, preferred_key: Option<&KeySignature>) -> Vec<NoteName> {
        let mut spellings = self.enharmonics[pc.value() as usize].clone();
        if let Some(key) = preferred_key {
            // Stable sort keeps the default order within each group
            spellings.sort_by_key(|n| !key.contains(*n));
        }
        spellings
    }

    /// Other spellings of the same pitch class
    pub fn enharmonics_of(&self, name: NoteName) -> Vec<NoteName> {
        self.enharmonics[name.pitch_class().value() as usize]
            .iter()
            .copied()
            .filter(|n| *n != name)
            .collect()
    }

    pub fn accidentals_of(&self, key: &KeySignature) -> BTreeMap<Letter, Accidental> {
        Letter::ALL
            .iter()
            .map(|&l| (l, key.accidental_for(l)))
            .filter(|(_, a)| *a != Accidental::Natural)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> NoteName {
        s.parse().unwrap()
    }

    #[test]
    fn test_pitch_class_reduction() {
        assert_eq!(PitchClass::new(13).value(), 1);
        assert_eq!(PitchClass::new(-1).value(), 11);
        assert_eq!(PitchClass::new(7).transpose(7).value(), 2);
    }

    #[test]
    fn test_pitch_class_of() {
        let t = tables();
        assert_eq!(t.pitch_class_of('C', Accidental::Sharp).unwrap().value(), 1);
        assert_eq!(t.pitch_class_of('D', Accidental::Flat).unwrap().value(), 1);
        assert_eq!(t.pitch_class_of('B', Accidental::Sharp).unwrap().value(), 0);
        assert_eq!(t.pitch_class_of('C', Accidental::Flat).unwrap().value(), 11);
        assert_eq!(t.pitch_class_of('Z', Accidental::Natural), Err(TheoryError::InvalidLetter('Z')));
    }

    #[test]
    fn test_enharmonic_mapping_is_total() {
        let t = tables();
        for pc in t.pitch_classes() {
            let spellings = t.spellings_of(*pc, None);
            assert!(!spellings.is_empty());
            assert!(spellings.iter().all(|n| n.pitch_class() == *pc));
        }
        assert_eq!(t.spellings_of(PitchClass::new(1), None)[..2], [name("C#"), name("Db")]);
        assert_eq!(t.spellings_of(PitchClass::new(0), None)[0], name("C"));
    }

    #[test]
    fn test_spellings_prefer_key() {
        let t = tables();
        let f_major = KeySignature::major(name("F"));
        assert_eq!(t.spellings_of(PitchClass::new(10), Some(&f_major))[0], name("Bb"));
        // No diatonic spelling: falls back to the sharp
        assert_eq!(t.spellings_of(PitchClass::new(6), Some(&f_major))[0], name("F#"));

        let g_sharp_major = KeySignature::major(name("G#"));
        assert_eq!(t.spellings_of(PitchClass::new(7), Some(&g_sharp_major))[0], name("Fx"));
    }

    #[test]
    fn test_key_signature_accidentals() {
        let d_major = KeySignature::major(name("D"));
        let acc = d_major.accidentals();
        assert_eq!(acc.len(), 2);
        assert_eq!(acc[&Letter::F], Accidental::Sharp);
        assert_eq!(acc[&Letter::C], Accidental::Sharp);
        assert_eq!(d_major.summary(), "2#");

        let c_minor = KeySignature::minor(name("C"));
        assert_eq!(c_minor.summary(), "3b");
        assert_eq!(c_minor.accidental_for(Letter::B), Accidental::Flat);
        assert_eq!(c_minor.accidental_for(Letter::E), Accidental::Flat);
        assert_eq!(c_minor.accidental_for(Letter::A), Accidental::Flat);
        assert_eq!(c_minor.accidental_for(Letter::D), Accidental::Natural);

        assert_eq!(KeySignature::major(name("C")).accidentals().len(), 0);
        assert_eq!(KeySignature::minor(name("A")).summary(), "0");
        assert_eq!(KeySignature::new(name("D"), Mode::Dorian).summary(), "0");
        assert_eq!(KeySignature::major(name("Cb")).summary(), "7b");
    }

    #[test]
    fn test_parse_key_signature() {
        let key: KeySignature = "Cmajor".parse().unwrap();
        assert_eq!(key, KeySignature::major(name("C")));
        let key: KeySignature = "F#minor".parse().unwrap();
        assert_eq!(key, KeySignature::minor(name("F#")));
        let key: KeySignature = "Bbm".parse().unwrap();
        assert_eq!(key, KeySignature::minor(name("Bb")));
        let key: KeySignature = "Bb".parse().unwrap();
        assert_eq!(key, KeySignature::major(name("Bb")));
        let key: KeySignature = "Ebmajor".parse().unwrap();
        assert_eq!(key, KeySignature::major(name("Eb")));
        let key: KeySignature = "Ddorian".parse().unwrap();
        assert_eq!(key.mode(), Mode::Dorian);
        assert!("Cwhatever".parse::<KeySignature>().is_err());
        assert!("H".parse::<KeySignature>().is_err());
    }

    #[test]
    fn test_circle_of_fifths() {
        let circle = tables().circle_of_fifths();
        let tonics: Vec<String> = circle.keys().iter().map(|k| k.tonic().to_string()).collect();
        assert_eq!(tonics, ["C", "G", "D", "A", "E", "B", "F#", "Db", "Ab", "Eb", "Bb", "F"]);

        // Neighbours are a fifth apart
        for (i, key) in circle.keys().iter().enumerate() {
            let next = circle.next(i);
            assert_eq!(key.tonic_pitch_class().transpose(7), next.tonic_pitch_class());
        }

        let minors: Vec<String> = circle.relative_minors().iter().map(|k| k.tonic().to_string()).collect();
        assert_eq!(minors[0], "A");
        assert_eq!(minors[6], "D#");
        assert_eq!(minors[7], "Bb");

        let gb = KeySignature::major(name("Gb"));
        assert_eq!(circle.position(&gb), 6);
        assert_eq!(circle.major_for(PitchClass::new(2)).tonic(), name("D"));
    }

    #[test]
    fn test_enharmonics_of() {
        let others = tables().enharmonics_of(name("C#"));
        assert!(others.contains(&name("Db")));
        assert!(others.contains(&name("Bx")));
        assert!(!others.contains(&name("C#")));
        assert!(name("E#").is_enharmonic(name("F")));
    }

    #[test]
    fn test_note_name_fifths_roundtrip() {
        for fifths in -15..=19 {
            let n = NoteName::from_fifths(fifths).unwrap();
            assert_eq!(n.fifths(), fifths);
        }
    }
}
