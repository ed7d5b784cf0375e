//! muco-services: synthesis, render configuration and WAV output

pub mod config;
pub mod render;
pub mod synth;
pub mod wav;

pub use config::{config_path, RenderConfig};
pub use render::{MidiClipRenderer, MusicRenderer, RenderError, WavRenderer};
pub use synth::{SampleBuffer, Synthesizer, Waveform};
pub use wav::{encode_wav, write_wav_atomic};
