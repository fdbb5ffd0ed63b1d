use std::path::PathBuf;

use clap::Parser;

/// melframes — MFCC feature frames for mono PCM signals.
#[derive(Parser, Debug)]
#[command(name = "melframes", version, about)]
pub struct Cli {
    /// Synthesize a sine tone at this frequency (Hz).
    #[arg(long, conflicts_with = "pcm")]
    pub tone: Option<f32>,

    /// Raw little-endian f32 mono samples.
    #[arg(long)]
    pub pcm: Option<PathBuf>,

    /// Sample rate of the input, in Hz.
    #[arg(short = 'r', long, default_value_t = 16000)]
    pub sample_rate: u32,

    /// Tone duration in seconds.
    #[arg(long, default_value_t = 1.0)]
    pub duration: f64,

    /// Tone amplitude.
    #[arg(long, default_value_t = 0.8)]
    pub amplitude: f32,

    /// TOML file with MFCC parameters.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Map frames in parallel.
    #[arg(long)]
    pub parallel: bool,

    /// Append delta coefficients computed over this many neighbouring frames.
    #[arg(long)]
    pub deltas: Option<usize>,

    /// Print duration, zero-crossing rate and frame count instead of coefficients.
    #[arg(long)]
    pub summary: bool,
}
