//! muco: compile score notation to a timeline and render it to WAV

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use muco_core::{compile, parse, MusicData, ScoreEvent};
use muco_services::{
    write_wav_atomic, MidiClipRenderer, MusicRenderer, RenderConfig, Synthesizer, Waveform,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "muco", about = "Music computation notation compiler and renderer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a score to a WAV file
    Render {
        /// Path to a score file
        score: PathBuf,

        /// Output WAV path
        #[arg(short, long)]
        output: PathBuf,

        /// Render config file (defaults to the user config directory)
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: RenderOverrides,
    },

    /// Parse and compile a score, then print its timeline
    Parse {
        /// Path to a score file
        score: PathBuf,

        /// Print the timeline as JSON
        #[arg(long)]
        json: bool,

        /// Print the tick-based MIDI clip as JSON instead
        #[arg(long, conflicts_with = "json")]
        midi: bool,
    },
}

/// Command-line values that win over the config file
#[derive(clap::Args, Debug, Default)]
struct RenderOverrides {
    /// Oscillator shape (sine, square, triangle, sawtooth)
    #[arg(long)]
    waveform: Option<String>,

    #[arg(long)]
    sample_rate: Option<u32>,

    /// 8, 16, 24 or 32
    #[arg(long)]
    bit_depth: Option<u16>,

    /// Worker threads for synthesis
    #[arg(long)]
    threads: Option<usize>,
}

impl RenderOverrides {
    fn apply(&self, mut config: RenderConfig) -> Result<RenderConfig> {
        if let Some(waveform) = &self.waveform {
            config.waveform = waveform.parse::<Waveform>()?;
        }
        if let Some(rate) = self.sample_rate {
            config.sample_rate = rate;
        }
        if let Some(bits) = self.bit_depth {
            config.bit_depth = bits;
        }
        if let Some(threads) = self.threads {
            config.render_threads = threads;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("muco=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            score,
            output,
            config,
            overrides,
        } => {
            let base = match config {
                Some(path) => RenderConfig::load(&path)
                    .with_context(|| format!("reading config {}", path.display()))?,
                None => RenderConfig::load_or_default(),
            };
            let config = overrides.apply(base)?;
            let data = compile_file(&score)?;
            let buffer = Synthesizer::new(config)?.render(&data)?;
            write_wav_atomic(&buffer, &output)
                .with_context(|| format!("writing {}", output.display()))?;
            info!(
                output = %output.display(),
                seconds = buffer.duration_secs(),
                "render complete"
            );
        }
        Command::Parse { score, json, midi } => {
            let data = compile_file(&score)?;
            if midi {
                let clip = MidiClipRenderer::default().render(&data)?;
                println!("{}", serde_json::to_string_pretty(&clip)?);
            } else if json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print_timeline(&data);
            }
        }
    }

    Ok(())
}

fn compile_file(path: &Path) -> Result<MusicData> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let score = parse(&text).with_context(|| format!("parsing {}", path.display()))?;
    let rests = score
        .events
        .iter()
        .filter(|e| matches!(e, ScoreEvent::Rest(_)))
        .count();
    info!(events = score.events.len(), rests, "parsed score");
    compile(&score).with_context(|| format!("compiling {}", path.display()))
}

fn print_timeline(data: &MusicData) {
    println!("Tempo: {} quarter notes/min", data.tempo);
    println!("Length: {:.3}s", data.total_duration);
    println!("Entries: {}", data.entries.len());
    println!();
    for entry in &data.entries {
        println!(
            "  {:>8.3}s  +{:.3}s  note {:>3}  {:>9.2} Hz  vel {:.2}  (event {})",
            entry.onset,
            entry.duration,
            entry.note_number,
            entry.frequency,
            entry.amplitude,
            entry.event_index
        );
    }
}
