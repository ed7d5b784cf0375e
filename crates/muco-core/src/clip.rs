//! Tick-based MIDI clip mapping of a compiled timeline

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::compiler::MusicData;

/// Default pulses per quarter note
pub const DEFAULT_PPQ: u16 = 480;

/// A single MIDI note event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiNote {
    /// MIDI note number (0-127, 60 = middle C)
    pub pitch: u8,
    /// Velocity (0-127)
    pub velocity: u8,
    /// Start position in ticks (PPQ-based)
    pub start_tick: u64,
    /// Duration in ticks
    pub duration_ticks: u64,
}

impl MidiNote {
    pub fn new(pitch: u8, velocity: u8, start_tick: u64, duration_ticks: u64) -> Self {
        Self {
            pitch,
            velocity,
            start_tick,
            duration_ticks,
        }
    }

    /// End tick (start + duration)
    pub fn end_tick(&self) -> u64 {
        self.start_tick + self.duration_ticks
    }
}

/// Notes on a tick grid, ready for a MIDI file writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiClip {
    /// Notes sorted by start_tick
    pub notes: Vec<MidiNote>,
    /// Pulses per quarter note (default 480)
    pub ppq: u16,
    /// Quarter notes per minute
    pub tempo: f64,
    /// Notated length in ticks, trailing rests included
    pub length_ticks: u64,
}

impl MidiClip {
    pub fn new(ppq: u16, tempo: f64) -> Self {
        Self {
            notes: Vec::new(),
            ppq,
            tempo,
            length_ticks: 0,
        }
    }

    /// Map a timeline onto ticks. Entries outside the MIDI range are skipped.
    pub fn from_music_data(data: &MusicData, ppq: u16) -> Self {
        let mut clip = Self::new(ppq, data.tempo);
        for entry in &data.entries {
            let Some(pitch) = u8::try_from(entry.note_number).ok().filter(|p| *p <= 127) else {
                warn!(note = entry.note_number, event = entry.event_index, "skipping note outside MIDI range");
                continue;
            };
            let velocity = (entry.amplitude * 127.0).round().clamp(0.0, 127.0) as u8;
            let start_tick = clip.seconds_to_ticks(entry.onset);
            let end_tick = clip.seconds_to_ticks(entry.end());
            clip.add_note(MidiNote::new(pitch, velocity, start_tick, end_tick - start_tick));
        }
        clip.length_ticks = clip.seconds_to_ticks(data.end_time());
        clip
    }

    pub fn seconds_to_ticks(&self, seconds: f64) -> u64 {
        (seconds * self.tempo / 60.0 * self.ppq as f64).round() as u64
    }

    /// Add a note, keeping notes sorted by start_tick
    pub fn add_note(&mut self, note: MidiNote) {
        let idx = self
            .notes
            .iter()
            .position(|n| n.start_tick > note.start_tick)
            .unwrap_or(self.notes.len());
        self.notes.insert(idx, note);
    }

    /// Last note-off tick
    pub fn end_tick(&self) -> u64 {
        self.notes.iter().map(MidiNote::end_tick).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::TimelineEntry;
    use crate::{compile, parse};

    #[test]
    fn test_quarters_map_to_ppq() {
        let data = compile(&parse("tempo=120\nC4q D4e. Rq").unwrap()).unwrap();
        let clip = MidiClip::from_music_data(&data, DEFAULT_PPQ);
        assert_eq!(clip.notes.len(), 2);
        assert_eq!(clip.notes[0], MidiNote::new(60, 127, 0, 480));
        assert_eq!(clip.notes[1], MidiNote::new(62, 127, 480, 360));
        assert_eq!(clip.end_tick(), 840);
        assert_eq!(clip.length_ticks, 1320);
    }

    #[test]
    fn test_velocity_scaling() {
        let data = compile(&parse("C4q@0.5 C4q@0").unwrap()).unwrap();
        let clip = MidiClip::from_music_data(&data, DEFAULT_PPQ);
        assert_eq!(clip.notes[0].velocity, 64);
        assert_eq!(clip.notes[1].velocity, 0);
    }

    #[test]
    fn test_out_of_range_notes_skipped() {
        let data = MusicData {
            entries: vec![TimelineEntry {
                onset: 0.0,
                duration: 0.5,
                frequency: 30_000.0,
                amplitude: 1.0,
                note_number: 140,
                event_index: 0,
            }],
            total_duration: 0.5,
            tempo: 120.0,
        };
        let clip = MidiClip::from_music_data(&data, DEFAULT_PPQ);
        assert!(clip.notes.is_empty());
        assert_eq!(clip.length_ticks, 480);
    }

    #[test]
    fn test_add_note_keeps_order() {
        let mut clip = MidiClip::new(DEFAULT_PPQ, 120.0);
        clip.add_note(MidiNote::new(64, 100, 960, 240));
        clip.add_note(MidiNote::new(60, 100, 0, 240));
        clip.add_note(MidiNote::new(62, 100, 480, 240));
        let starts: Vec<u64> = clip.notes.iter().map(|n| n.start_tick).collect();
        assert_eq!(starts, [0, 480, 960]);
    }
}
