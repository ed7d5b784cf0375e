//! Tone synthesis: timeline entries mixed into a quantized PCM buffer

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::bounded;
use muco_core::{MusicData, TimelineEntry};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::RenderConfig;
use crate::render::RenderError;

/// Oscillator shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

impl Waveform {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sine => "sine",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Sawtooth => "sawtooth",
        }
    }

    /// Value at `phase` (in cycles, 0..1). Sine, triangle and sawtooth start at
    /// zero; square starts high.
    pub fn sample(&self, phase: f64) -> f64 {
        match self {
            Self::Sine => (phase * std::f64::consts::TAU).sin(),
            Self::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Self::Triangle => 1.0 - 4.0 * ((phase + 0.25).fract() - 0.5).abs(),
            Self::Sawtooth => 2.0 * (phase + 0.5).fract() - 1.0,
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sine" => Ok(Self::Sine),
            "square" => Ok(Self::Square),
            "triangle" => Ok(Self::Triangle),
            "sawtooth" | "saw" => Ok(Self::Sawtooth),
            _ => Err(RenderError::UnsupportedWaveform(s.to_string())),
        }
    }
}

impl TryFrom<String> for Waveform {
    type Error = RenderError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Waveform> for String {
    fn from(w: Waveform) -> Self {
        w.name().to_string()
    }
}

/// Quantized mono PCM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    pub sample_rate: u32,
    pub bit_depth: u16,
    pub samples: Vec<i32>,
    /// Samples hard-clamped during quantization (always 0 when normalized)
    pub clipped_samples: usize,
}

impl SampleBuffer {
    /// Largest positive sample value for a bit depth
    pub fn full_scale(bit_depth: u16) -> i32 {
        ((1i64 << (bit_depth - 1)) - 1) as i32
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample
    pub fn peak(&self) -> u32 {
        self.samples.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0)
    }
}

/// Rendered samples of one entry, placed at `start`
struct Voice {
    start: usize,
    samples: Vec<f64>,
}

/// Deterministic tone generator
#[derive(Debug, Clone)]
pub struct Synthesizer {
    config: RenderConfig,
}

impl Synthesizer {
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn synthesize(&self, data: &MusicData) -> Result<SampleBuffer, RenderError> {
        self.synthesize_with_cancel(data, &AtomicBool::new(false))
    }

    /// Render, checking `cancel` between entries
    pub fn synthesize_with_cancel(&self, data: &MusicData, cancel: &AtomicBool) -> Result<SampleBuffer, RenderError> {
        let rate = self.config.sample_rate as f64;
        let total = (data.end_time() * rate).ceil() as usize;
        let mut mix = vec![0.0f64; total];

        let threads = self.config.render_threads.min(data.entries.len());
        let voices = if threads > 1 {
            self.render_parallel(&data.entries, total, threads, cancel)?
        } else {
            self.render_sequential(&data.entries, total, cancel)?
        };

        // Index order keeps the floating-point sums identical for any thread count
        for voice in &voices {
            for (slot, s) in mix[voice.start..].iter_mut().zip(&voice.samples) {
                *slot += s;
            }
        }

        let peak = mix.iter().map(|s| s.abs()).fold(0.0f64, f64::max);
        if self.config.normalize && peak > 1.0 {
            let gain = 1.0 / peak;
            mix.iter_mut().for_each(|s| *s *= gain);
            debug!(peak, gain, "normalized mix");
        }

        let buffer = self.quantize(&mix);
        if buffer.clipped_samples > 0 {
            warn!(
                clipped = buffer.clipped_samples,
                peak, "samples clamped to full scale with normalization disabled"
            );
        }

        info!(
            entries = data.entries.len(),
            samples = buffer.len(),
            sample_rate = buffer.sample_rate,
            bit_depth = buffer.bit_depth,
            "rendered timeline"
        );
        Ok(buffer)
    }

    fn render_sequential(
        &self,
        entries: &[TimelineEntry],
        total: usize,
        cancel: &AtomicBool,
    ) -> Result<Vec<Voice>, RenderError> {
        entries
            .iter()
            .map(|entry| {
                if cancel.load(Ordering::Relaxed) {
                    return Err(RenderError::Cancelled);
                }
                Ok(self.render_entry(entry, total))
            })
            .collect()
    }

    fn render_parallel(
        &self,
        entries: &[TimelineEntry],
        total: usize,
        threads: usize,
        cancel: &AtomicBool,
    ) -> Result<Vec<Voice>, RenderError> {
        let (job_tx, job_rx) = bounded::<(usize, &TimelineEntry)>(threads);
        let (result_tx, result_rx) = bounded::<(usize, Voice)>(threads);
        let mut slots: Vec<Option<Voice>> = entries.iter().map(|_| None).collect();

        thread::scope(|scope| {
            scope.spawn(move || {
                for job in entries.iter().enumerate() {
                    if cancel.load(Ordering::Relaxed) || job_tx.send(job).is_err() {
                        break;
                    }
                }
            });

            for _ in 0..threads {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for (index, entry) in job_rx {
                        if cancel.load(Ordering::Relaxed) {
                            break;
                        }
                        if result_tx.send((index, self.render_entry(entry, total))).is_err() {
                            break;
                        }
                    }
                });
            }
            // Only workers may hold channel ends past this point, so a cancelled
            // worker pool also unblocks the feeder and ends the collect loop
            drop(job_rx);
            drop(result_tx);

            for (index, voice) in result_rx {
                slots[index] = Some(voice);
            }
        });

        if cancel.load(Ordering::Relaxed) {
            return Err(RenderError::Cancelled);
        }
        slots
            .into_iter()
            .map(|slot| slot.ok_or(RenderError::Cancelled))
            .collect()
    }

    fn render_entry(&self, entry: &TimelineEntry, total: usize) -> Voice {
        let rate = self.config.sample_rate as f64;
        let start = ((entry.onset * rate).round() as usize).min(total);
        let len = ((entry.duration * rate).round() as usize).min(total - start);

        let fade = ((self.config.fade_ms.max(0.0) / 1000.0 * rate).round() as usize).min(len / 2);
        let step = entry.frequency / rate;
        let amplitude = entry.amplitude as f64;

        let mut phase = 0.0f64;
        let samples = (0..len)
            .map(|i| {
                let envelope = if fade == 0 {
                    1.0
                } else {
                    let fade_in = i as f64 / fade as f64;
                    let fade_out = (len - 1 - i) as f64 / fade as f64;
                    fade_in.min(fade_out).min(1.0)
                };
                let value = self.config.waveform.sample(phase) * amplitude * envelope;
                phase = (phase + step).fract();
                value
            })
            .collect();

        Voice { start, samples }
    }

    fn quantize(&self, mix: &[f64]) -> SampleBuffer {
        let full = SampleBuffer::full_scale(self.config.bit_depth) as f64;
        let (min, max) = (-full - 1.0, full);
        let mut clipped_samples = 0;

        let samples = mix
            .iter()
            .map(|s| {
                let v = (s * full).round();
                if v > max || v < min {
                    clipped_samples += 1;
                }
                v.clamp(min, max) as i32
            })
            .collect();

        SampleBuffer {
            sample_rate: self.config.sample_rate,
            bit_depth: self.config.bit_depth,
            samples,
            clipped_samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muco_core::{compile, parse};

    fn music(text: &str) -> MusicData {
        compile(&parse(text).unwrap()).unwrap()
    }

    fn synth(config: RenderConfig) -> Synthesizer {
        Synthesizer::new(config).unwrap()
    }

    #[test]
    fn test_buffer_length_matches_timeline() {
        let data = music("C4q D4q E4q F4q");
        let buffer = synth(RenderConfig::default()).synthesize(&data).unwrap();
        assert_eq!(buffer.len(), 88200);
        assert_eq!(buffer.sample_rate, 44100);
        assert_eq!(buffer.bit_depth, 16);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let data = music("[C4q E4q G4q] D4e. F#4s Rq [A3h C4h E4h]");
        let a = synth(RenderConfig::default()).synthesize(&data).unwrap();
        let b = synth(RenderConfig::default()).synthesize(&data).unwrap();
        assert_eq!(a, b);

        let threaded = synth(RenderConfig {
            render_threads: 4,
            ..Default::default()
        })
        .synthesize(&data)
        .unwrap();
        assert_eq!(a, threaded);
    }

    #[test]
    fn test_normalized_peak_within_range() {
        // Six full-velocity notes overlap well beyond full scale
        let data = music("[C4q E4q G4q C5q E5q G5q]");
        let buffer = synth(RenderConfig::default()).synthesize(&data).unwrap();
        let full = SampleBuffer::full_scale(16) as u32;
        assert!(buffer.peak() <= full);
        assert!(buffer.peak() > full / 2);
        assert_eq!(buffer.clipped_samples, 0);
    }

    #[test]
    fn test_clipping_recorded_without_normalization() {
        let data = music("[C4q E4q G4q C5q E5q G5q]");
        let buffer = synth(RenderConfig {
            normalize: false,
            ..Default::default()
        })
        .synthesize(&data)
        .unwrap();
        assert!(buffer.clipped_samples > 0);
        assert!(buffer.samples.iter().all(|&s| (-32768..=32767).contains(&s)));
    }

    #[test]
    fn test_fades_start_and_end_silent() {
        let data = music("A4q");
        for waveform in [Waveform::Sine, Waveform::Square, Waveform::Triangle, Waveform::Sawtooth] {
            let buffer = synth(RenderConfig {
                waveform,
                ..Default::default()
            })
            .synthesize(&data)
            .unwrap();
            assert_eq!(buffer.samples[0], 0, "{waveform}");
            assert_eq!(*buffer.samples.last().unwrap(), 0, "{waveform}");
            // 5 ms fade at 44.1 kHz is 221 samples; the early ramp stays small
            assert!(buffer.samples[10].unsigned_abs() < 32767 / 10, "{waveform}");
        }
    }

    #[test]
    fn test_square_reaches_full_scale() {
        let data = music("A4q");
        let buffer = synth(RenderConfig {
            waveform: Waveform::Square,
            fade_ms: 0.0,
            ..Default::default()
        })
        .synthesize(&data)
        .unwrap();
        assert_eq!(buffer.samples[0], 32767);
        assert_eq!(buffer.peak(), 32767);
    }

    #[test]
    fn test_waveform_starting_values() {
        assert_eq!(Waveform::Sine.sample(0.0), 0.0);
        assert_eq!(Waveform::Triangle.sample(0.0), 0.0);
        assert_eq!(Waveform::Sawtooth.sample(0.0), 0.0);
        assert_eq!(Waveform::Square.sample(0.0), 1.0);
        assert_eq!(Waveform::Square.sample(0.5), -1.0);
        assert_eq!(Waveform::Triangle.sample(0.25), 1.0);
    }

    #[test]
    fn test_rest_only_timeline_is_silent() {
        let data = music("Rh");
        let buffer = synth(RenderConfig::default()).synthesize(&data).unwrap();
        assert_eq!(buffer.len(), 44100);
        assert!(buffer.samples.iter().all(|&s| s == 0));

        let empty = synth(RenderConfig::default()).synthesize(&MusicData::default()).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_onset_is_sample_accurate() {
        let data = music("Rq A4q");
        let buffer = synth(RenderConfig {
            waveform: Waveform::Square,
            fade_ms: 0.0,
            ..Default::default()
        })
        .synthesize(&data)
        .unwrap();
        assert_eq!(buffer.samples[22049], 0);
        assert_eq!(buffer.samples[22050], 32767);
    }

    #[test]
    fn test_bit_depths() {
        let data = music("A4q");
        for (bits, full) in [(8u16, 127i32), (16, 32767), (24, 8_388_607), (32, i32::MAX)] {
            let buffer = synth(RenderConfig {
                bit_depth: bits,
                waveform: Waveform::Square,
                fade_ms: 0.0,
                ..Default::default()
            })
            .synthesize(&data)
            .unwrap();
            assert_eq!(SampleBuffer::full_scale(bits), full);
            assert_eq!(buffer.samples[0], full);
        }
    }

    #[test]
    fn test_cancellation() {
        let data = music("C4q D4q");
        let cancel = AtomicBool::new(true);
        let result = synth(RenderConfig::default()).synthesize_with_cancel(&data, &cancel);
        assert!(matches!(result, Err(RenderError::Cancelled)));

        let result = synth(RenderConfig {
            render_threads: 2,
            ..Default::default()
        })
        .synthesize_with_cancel(&data, &cancel);
        assert!(matches!(result, Err(RenderError::Cancelled)));
    }

    #[test]
    fn test_parse_waveform() {
        assert_eq!("Square".parse::<Waveform>().unwrap(), Waveform::Square);
        assert!(matches!(
            "organ".parse::<Waveform>(),
            Err(RenderError::UnsupportedWaveform(_))
        ));
    }
}
