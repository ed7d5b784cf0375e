//! Notation parser: score text into header + ordered events
//!
//! ```text
//! # comment
//! key=Dmajor tempo=96 beat=q velocity=0.8 octave=4
//! D4q F#4e. G4s [D4 F#4 A4]h~ [D4 F#4 A4]q Rq
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::duration::{Duration, DurationValue, MAX_DOTS};
use crate::error::{MucoError, Position, Result, TheoryError};
use crate::pitch::SpelledNote;
use crate::theory::{Accidental, KeySignature, Letter};

/// Score-wide settings declared before the first event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub key: Option<KeySignature>,
    /// Beats per minute
    pub tempo: f64,
    pub beat_unit: Duration,
    /// Default velocity for notes without `@`
    pub velocity: f32,
    /// Default octave for notes without an explicit octave
    pub octave: i32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            key: None,
            tempo: 120.0,
            beat_unit: Duration::new(DurationValue::Quarter),
            velocity: 1.0,
            octave: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: SpelledNote,
    pub duration: Duration,
    /// `None` takes the header velocity
    pub velocity: Option<f32>,
    pub position: Position,
}

/// Simultaneous notes sharing one duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    pub notes: Vec<Note>,
    pub duration: Duration,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rest {
    pub duration: Duration,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScoreEvent {
    Note(Note),
    Chord(Chord),
    Rest(Rest),
}

impl ScoreEvent {
    pub fn duration(&self) -> &Duration {
        match self {
            Self::Note(n) => &n.duration,
            Self::Chord(c) => &c.duration,
            Self::Rest(r) => &r.duration,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Self::Note(n) => n.position,
            Self::Chord(c) => c.position,
            Self::Rest(r) => r.position,
        }
    }

    pub fn is_tied(&self) -> bool {
        self.duration().tied
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Note(_) => "note",
            Self::Chord(_) => "chord",
            Self::Rest(_) => "rest",
        }
    }
}

/// Parsed score: header plus events in source order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Score {
    pub header: Header,
    pub events: Vec<ScoreEvent>,
}

/// Parse notation text into a [`Score`]
pub fn parse(input: &str) -> Result<Score> {
    let mut score = Score::default();

    for (line_idx, line) in input.lines().enumerate() {
        let line_num = line_idx + 1;
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut cursor = LineCursor::new(line, line_num);
        cursor.skip_whitespace();
        if first_token(trimmed).contains('=') {
            if !score.events.is_empty() {
                return Err(MucoError::syntax(
                    cursor.position(),
                    "header settings must precede the first event",
                ));
            }
            parse_header_line(&mut cursor, &mut score.header)?;
        } else {
            parse_body_line(&mut cursor, &score.header, &mut score.events)?;
        }
    }

    debug!(events = score.events.len(), tempo = score.header.tempo, "parsed score");
    Ok(score)
}

fn first_token(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or("")
}

fn is_duration_symbol(c: char) -> bool {
    DurationValue::from_symbol(c).is_some()
}

/// Character cursor over one line with 1-based columns
struct LineCursor {
    chars: Vec<char>,
    index: usize,
    line: usize,
}

impl LineCursor {
    fn new(text: &str, line: usize) -> Self {
        Self {
            chars: text.chars().collect(),
            index: 0,
            line,
        }
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.index + 1)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.get(self.index + n).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.index += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.index += 1;
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek().filter(|&c| pred(c)) {
            out.push(c);
            self.index += 1;
        }
        out
    }

    fn error(&self, message: impl Into<String>) -> MucoError {
        MucoError::syntax(self.position(), message)
    }
}

// ============================================================================
// Header
// ============================================================================

fn parse_header_line(cursor: &mut LineCursor, header: &mut Header) -> Result<()> {
    while cursor.peek().is_some() {
        let name_pos = cursor.position();
        let name = cursor.take_while(|c| c != '=' && !c.is_whitespace());
        if !cursor.eat('=') {
            return Err(MucoError::syntax(name_pos, format!("expected name=value, found {name:?}")));
        }
        let value_pos = cursor.position();
        let value = cursor.take_while(|c| !c.is_whitespace());
        let invalid = |detail: String| MucoError::syntax(value_pos, format!("invalid {name} value {value:?}: {detail}"));

        match name.as_str() {
            "key" => header.key = Some(value.parse().map_err(|e: TheoryError| invalid(e.to_string()))?),
            "tempo" => {
                header.tempo = value
                    .parse()
                    .map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?
            }
            "beat" => {
                header.beat_unit = value.parse().map_err(|e: TheoryError| invalid(e.to_string()))?
            }
            "velocity" => {
                header.velocity = value
                    .parse()
                    .map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?
            }
            "octave" => {
                header.octave = value
                    .parse()
                    .map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?
            }
            _ => return Err(MucoError::syntax(name_pos, format!("unknown header setting {name:?}"))),
        }
        cursor.skip_whitespace();
    }
    Ok(())
}

// ============================================================================
// Body
// ============================================================================

fn parse_body_line(cursor: &mut LineCursor, header: &Header, events: &mut Vec<ScoreEvent>) -> Result<()> {
    while let Some(c) = cursor.peek() {
        if c.is_whitespace() {
            cursor.bump();
            continue;
        }

        let event = match c {
            '[' => ScoreEvent::Chord(parse_chord(cursor, header)?),
            'R' => {
                let position = cursor.position();
                cursor.bump();
                let duration = parse_duration(cursor)?.ok_or_else(|| cursor.error("rest needs a duration"))?;
                ScoreEvent::Rest(Rest { duration, position })
            }
            'A'..='G' => {
                let note = parse_note(cursor, header)?;
                let Some(duration) = note.duration else {
                    return Err(cursor.error("note needs a duration"));
                };
                ScoreEvent::Note(Note {
                    pitch: note.pitch,
                    duration,
                    velocity: note.velocity,
                    position: note.position,
                })
            }
            c if is_duration_symbol(c) => {
                return Err(cursor.error(format!("duration {c:?} has no pitch or rest before it")));
            }
            c => return Err(cursor.error(format!("unexpected character {c:?}"))),
        };
        events.push(event);

        if let Some(next) = cursor.peek().filter(|c| !c.is_whitespace()) {
            return Err(cursor.error(format!("expected whitespace before {next:?}")));
        }
    }
    Ok(())
}

/// Note as read, before the chord/body decides about a missing duration
struct PartialNote {
    pitch: SpelledNote,
    duration: Option<Duration>,
    velocity: Option<f32>,
    position: Position,
}

fn parse_note(cursor: &mut LineCursor, header: &Header) -> Result<PartialNote> {
    let position = cursor.position();
    let letter = cursor
        .bump()
        .ok_or_else(|| cursor.error("expected a note letter"))
        .and_then(|c| Letter::from_char(c).map_err(|e| MucoError::syntax(position, e.to_string())))?;

    let accidental = parse_accidental(cursor)?;

    let octave_pos = cursor.position();
    let digits = cursor.take_while(|c| c.is_ascii_digit());
    let octave = if digits.is_empty() {
        header.octave
    } else {
        digits
            .parse()
            .map_err(|_| MucoError::syntax(octave_pos, format!("invalid octave {digits:?}")))?
    };

    let duration = parse_duration(cursor)?;

    let velocity = if cursor.peek() == Some('@') {
        let at = cursor.position();
        cursor.bump();
        let number = cursor.take_while(|c| c.is_ascii_digit() || c == '.');
        Some(
            number
                .parse::<f32>()
                .map_err(|_| MucoError::syntax(at, format!("invalid velocity {number:?}")))?,
        )
    } else {
        None
    };

    Ok(PartialNote {
        pitch: SpelledNote::new(letter, accidental, octave),
        duration,
        velocity,
        position,
    })
}

fn parse_accidental(cursor: &mut LineCursor) -> Result<Option<Accidental>> {
    let position = cursor.position();
    let symbol = match cursor.peek() {
        Some(c @ ('#' | 'b')) => {
            cursor.bump();
            if cursor.eat(c) {
                format!("{c}{c}")
            } else {
                c.to_string()
            }
        }
        // `x` is a double sharp only when more of the note follows; otherwise it is
        // the sixty-fourth duration
        Some('x') => {
            let next = cursor.peek_nth(1);
            if next.is_some_and(|n| n.is_ascii_digit() || is_duration_symbol(n)) {
                cursor.bump();
                "x".to_string()
            } else {
                return Ok(None);
            }
        }
        Some(c @ ('n' | '♯' | '♭' | '𝄪' | '𝄫' | '♮')) => {
            cursor.bump();
            c.to_string()
        }
        _ => return Ok(None),
    };
    Accidental::from_symbol(&symbol)
        .map(Some)
        .map_err(|e| MucoError::syntax(position, e.to_string()))
}

fn parse_duration(cursor: &mut LineCursor) -> Result<Option<Duration>> {
    let Some(value) = cursor.peek().and_then(DurationValue::from_symbol) else {
        return Ok(None);
    };
    cursor.bump();

    let mut dots = 0u8;
    while cursor.peek() == Some('.') {
        if dots == MAX_DOTS {
            return Err(cursor.error("at most two dots are allowed"));
        }
        cursor.bump();
        dots += 1;
    }
    let tied = cursor.eat('~');
    Ok(Some(Duration::dotted(value, dots).with_tie(tied)))
}

fn parse_chord(cursor: &mut LineCursor, header: &Header) -> Result<Chord> {
    let position = cursor.position();
    cursor.bump();

    let mut partials = Vec::new();
    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            Some(']') => {
                cursor.bump();
                break;
            }
            Some('A'..='G') => partials.push(parse_note(cursor, header)?),
            Some(c) => return Err(cursor.error(format!("unexpected character {c:?} in chord"))),
            None => return Err(MucoError::syntax(position, "unterminated chord bracket")),
        }
        if let Some(c) = cursor.peek().filter(|c| !c.is_whitespace() && *c != ']') {
            return Err(cursor.error(format!("unexpected character {c:?} in chord")));
        }
    }

    if partials.is_empty() {
        return Err(MucoError::syntax(position, "empty chord"));
    }

    let suffix = parse_duration(cursor)?;
    let base = match suffix {
        Some(d) => d,
        None => partials[0]
            .duration
            .ok_or_else(|| MucoError::syntax(partials[0].position, "chord needs a duration"))?,
    };
    // `]~` ties a chord whose notes carry the duration
    let duration = if suffix.is_none() && cursor.eat('~') {
        base.with_tie(true)
    } else {
        base
    };

    let notes = partials
        .into_iter()
        .map(|p| {
            let stated = match (p.duration, suffix) {
                (Some(d), Some(_)) => Some(d.same_value(&duration)),
                (Some(d), None) => Some(d == base),
                (None, Some(_)) => None,
                (None, None) => return Err(MucoError::syntax(p.position, "chord note needs a duration")),
            };
            if stated == Some(false) {
                return Err(MucoError::syntax(p.position, "chord notes must share the chord's duration"));
            }
            Ok(Note {
                pitch: p.pitch,
                duration,
                velocity: p.velocity,
                position: p.position,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Chord {
        notes,
        duration,
        position,
    })
}
