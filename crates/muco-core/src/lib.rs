//! muco-core: music theory, notation parsing and timeline compilation

mod clip;
mod compiler;
pub mod duration;
mod error;
pub mod harmony;
pub mod notation;
pub mod pitch;
pub mod scale;
pub mod theory;

pub use clip::{MidiClip, MidiNote, DEFAULT_PPQ};
pub use compiler::{compile, MusicData, ScoreCompiler, TimelineEntry};
pub use duration::{Duration, DurationResolver, DurationValue};
pub use error::{MucoError, Position, Result, TheoryError};
pub use harmony::{chord_notes, ChordQuality, Direction, Interval};
pub use notation::{parse, Chord, Header, Note, Rest, Score, ScoreEvent};
pub use pitch::{frequency_of, PitchResolver, ResolvedPitch, SpelledNote};
pub use scale::{Scale, ScaleKind};
pub use theory::{tables, Accidental, CircleOfFifths, KeySignature, Letter, Mode, NoteName, PitchClass, TheoryTables};
