//! Output backends sharing one render capability

use muco_core::{MidiClip, MusicData, DEFAULT_PPQ};
use thiserror::Error;

use crate::config::RenderConfig;
use crate::synth::{SampleBuffer, Synthesizer};
use crate::wav::encode_wav;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unsupported waveform: {0:?}")]
    UnsupportedWaveform(String),
    #[error("Unsupported bit depth: {0} (expected 8, 16, 24 or 32)")]
    UnsupportedBitDepth(u16),
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),
    #[error("Render cancelled")]
    Cancelled,
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Turns a compiled timeline into some output
pub trait MusicRenderer {
    type Output;

    fn render(&self, data: &MusicData) -> Result<Self::Output, RenderError>;
}

impl MusicRenderer for Synthesizer {
    type Output = SampleBuffer;

    fn render(&self, data: &MusicData) -> Result<SampleBuffer, RenderError> {
        self.synthesize(data)
    }
}

/// Synthesizes and encodes into WAV bytes
#[derive(Debug, Clone)]
pub struct WavRenderer {
    synth: Synthesizer,
}

impl WavRenderer {
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        Ok(Self {
            synth: Synthesizer::new(config)?,
        })
    }
}

impl MusicRenderer for WavRenderer {
    type Output = Vec<u8>;

    fn render(&self, data: &MusicData) -> Result<Vec<u8>, RenderError> {
        encode_wav(&self.synth.synthesize(data)?)
    }
}

/// Maps the timeline onto a tick grid
#[derive(Debug, Clone, Copy)]
pub struct MidiClipRenderer {
    pub ppq: u16,
}

impl Default for MidiClipRenderer {
    fn default() -> Self {
        Self { ppq: DEFAULT_PPQ }
    }
}

impl MusicRenderer for MidiClipRenderer {
    type Output = MidiClip;

    fn render(&self, data: &MusicData) -> Result<MidiClip, RenderError> {
        Ok(MidiClip::from_music_data(data, self.ppq))
    }
}
