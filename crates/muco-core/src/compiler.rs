//! Score compiler: parsed events into an absolute-time timeline

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::duration::DurationResolver;
use crate::error::{MucoError, Result, TheoryError};
use crate::notation::{Header, Note, Score, ScoreEvent};
use crate::pitch::PitchResolver;

/// One sounding pitch on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Onset in seconds
    pub onset: f64,
    /// Length in seconds (tied spans included)
    pub duration: f64,
    pub frequency: f64,
    /// Velocity in 0..=1
    pub amplitude: f32,
    /// Semitone index; equals the MIDI note number within 0..=127
    pub note_number: i32,
    /// Index of the originating score event
    pub event_index: usize,
}

impl TimelineEntry {
    pub fn end(&self) -> f64 {
        self.onset + self.duration
    }
}

/// Compiled timeline, entries ascending by onset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MusicData {
    pub entries: Vec<TimelineEntry>,
    /// Sum of every event span, trailing rests included
    pub total_duration: f64,
    /// Quarter notes per minute
    pub tempo: f64,
}

impl MusicData {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time at which both the notation and the last entry have finished
    pub fn end_time(&self) -> f64 {
        self.entries
            .iter()
            .map(TimelineEntry::end)
            .fold(self.total_duration, f64::max)
    }
}

fn semantic(event: usize, source: TheoryError) -> MucoError {
    MucoError::Semantic { event, source }
}

/// Compiles scores under one header's key, tempo and defaults
#[derive(Debug, Clone)]
pub struct ScoreCompiler {
    pitches: PitchResolver,
    durations: DurationResolver,
    default_velocity: f32,
}

impl ScoreCompiler {
    pub fn new(header: &Header) -> Result<Self> {
        let durations = DurationResolver::new(header.tempo, header.beat_unit)?;
        if !(0.0..=1.0).contains(&header.velocity) {
            return Err(TheoryError::InvalidVelocity(header.velocity).into());
        }
        Ok(Self {
            pitches: PitchResolver::new(header.key),
            durations,
            default_velocity: header.velocity,
        })
    }

    /// Lay events end to end. Tied successors extend the first event and emit nothing.
    pub fn compile(&self, score: &Score) -> Result<MusicData> {
        let events = &score.events;
        let mut entries = Vec::new();
        let mut cursor = 0.0;
        let mut index = 0;

        while index < events.len() {
            let event = &events[index];
            let mut chain = vec![*event.duration()];

            let mut last = index;
            while events[last].is_tied() {
                let next = events.get(last + 1).ok_or_else(|| semantic(last, TheoryError::DanglingTie))?;
                if self.sounding(&events[last], last)? != self.sounding(next, last + 1)? {
                    return Err(semantic(last + 1, TheoryError::TieMismatch));
                }
                chain.push(*next.duration());
                last += 1;
            }
            let span = self.durations.seconds_tied(&chain);

            match event {
                ScoreEvent::Note(note) => entries.push(self.entry(note, cursor, span, index)?),
                ScoreEvent::Chord(chord) => {
                    for note in &chord.notes {
                        entries.push(self.entry(note, cursor, span, index)?);
                    }
                }
                ScoreEvent::Rest(_) => {}
            }

            cursor += span;
            index = last + 1;
        }

        let data = MusicData {
            entries,
            total_duration: cursor,
            tempo: self.durations.tempo() * self.durations.beat_unit().quarters(),
        };
        debug!(
            events = events.len(),
            entries = data.entries.len(),
            total_duration = data.total_duration,
            "compiled score"
        );
        Ok(data)
    }

    fn entry(&self, note: &Note, onset: f64, duration: f64, event_index: usize) -> Result<TimelineEntry> {
        let pitch = self
            .pitches
            .resolve(&note.pitch)
            .map_err(|e| semantic(event_index, e))?;
        let amplitude = note.velocity.unwrap_or(self.default_velocity);
        if !(0.0..=1.0).contains(&amplitude) {
            return Err(semantic(event_index, TheoryError::InvalidVelocity(amplitude)));
        }
        Ok(TimelineEntry {
            onset,
            duration,
            frequency: pitch.frequency,
            amplitude,
            note_number: pitch.semitone,
            event_index,
        })
    }

    /// Kind plus sorted semitones, for tie matching
    fn sounding(&self, event: &ScoreEvent, index: usize) -> Result<(&'static str, Vec<i32>)> {
        let notes: &[Note] = match event {
            ScoreEvent::Note(n) => std::slice::from_ref(n),
            ScoreEvent::Chord(c) => &c.notes,
            ScoreEvent::Rest(_) => &[],
        };
        let mut semitones = notes
            .iter()
            .map(|n| self.pitches.resolve(&n.pitch).map(|p| p.semitone))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| semantic(index, e))?;
        semitones.sort_unstable();
        Ok((event.kind(), semitones))
    }
}

/// Compile a score under its own header
pub fn compile(score: &Score) -> Result<MusicData> {
    ScoreCompiler::new(&score.header)?.compile(score)
}
