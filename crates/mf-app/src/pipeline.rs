use std::f32::consts::PI;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use mf_core::config::MfccConfig;
use mf_core::frame::MfccFrame;
use mf_core::signal::Signal;
use mf_dsp::delta::deltas;
use mf_dsp::features::FeatureSet;

use crate::cli::Cli;

/// Load the input signal selected on the command line.
///
/// # Errors
/// Returns an error if no source is given or the PCM file is unreadable.
pub fn load_samples(cli: &Cli) -> Result<Vec<f32>> {
    if let Some(freq) = cli.tone {
        log::info!("Synthesizing {freq} Hz tone, {}s", cli.duration);
        return Ok(sine(freq, cli.amplitude, cli.duration, cli.sample_rate));
    }
    if let Some(ref path) = cli.pcm {
        return read_pcm_f32le(path);
    }
    anyhow::bail!("No input: pass --tone <HZ> or --pcm <FILE>")
}

/// Sine tone of `duration` seconds.
///
/// # Example
/// ```
/// use mf_app::pipeline::sine;
/// let tone = sine(440.0, 1.0, 0.5, 16000);
/// assert_eq!(tone.len(), 8000);
/// ```
#[must_use]
pub fn sine(freq: f32, amplitude: f32, duration: f64, sample_rate: u32) -> Vec<f32> {
    let len = (duration.max(0.0) * f64::from(sample_rate)).round() as usize;
    (0..len)
        .map(|i| amplitude * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// Read headerless little-endian f32 samples.
///
/// # Errors
/// Returns an error if the file cannot be read or its size is not a multiple of 4.
pub fn read_pcm_f32le(path: &Path) -> Result<Vec<f32>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Cannot read PCM {}", path.display()))?;
    if bytes.len() % 4 != 0 {
        anyhow::bail!(
            "PCM file {} has {} bytes, not a whole number of f32 samples",
            path.display(),
            bytes.len()
        );
    }
    let samples = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect::<Vec<_>>();
    log::info!("Read {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

/// Merge the file config (if any) with command-line overrides.
///
/// # Errors
/// Returns an error if the config file cannot be loaded.
pub fn resolve_config(cli: &Cli) -> Result<MfccConfig> {
    let mut config = match cli.config {
        Some(ref path) => MfccConfig::load(path)?,
        None => MfccConfig::default(),
    };
    config.parallel |= cli.parallel;
    Ok(config)
}

/// Run the extraction and write the report to `out`.
///
/// # Errors
/// Returns an error on invalid configuration or write failure.
pub fn run(cli: &Cli, samples: &[f32], config: &MfccConfig, out: &mut impl Write) -> Result<()> {
    let signal = Signal::new(samples, cli.sample_rate);
    let features =
        mf_dsp::features::analyze(&signal, config).context("MFCC extraction failed")?;

    if cli.summary {
        return write_summary(&features, out);
    }

    let rows = match cli.deltas {
        Some(width) => with_deltas(&features.mfcc, width)?,
        None => features.mfcc,
    };
    for row in &rows {
        let line = row
            .iter()
            .map(|c| format!("{c:.6}"))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn with_deltas(frames: &[MfccFrame], width: usize) -> Result<Vec<MfccFrame>> {
    let d = deltas(frames, width)?;
    Ok(frames
        .iter()
        .zip(d)
        .map(|(c, d)| c.iter().copied().chain(d).collect())
        .collect())
}

fn write_summary(features: &FeatureSet, out: &mut impl Write) -> Result<()> {
    writeln!(out, "duration_s,{:.4}", features.duration_secs)?;
    writeln!(out, "zero_crossing_rate,{:.6}", features.zero_crossing_rate)?;
    writeln!(out, "frames,{}", features.mfcc.len())?;
    let peak = features
        .spectrum
        .bins()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(0.0, |(hz, _)| hz);
    writeln!(out, "peak_hz,{peak:.1}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("melframes").chain(args.iter().copied()))
    }

    #[test]
    fn tone_to_csv_rows() {
        let cli = cli(&["--tone", "440", "--duration", "1.0"]);
        let samples = load_samples(&cli).unwrap();
        assert_eq!(samples.len(), 16000);
        let mut out = Vec::new();
        run(&cli, &samples, &MfccConfig::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 99);
        assert!(lines.iter().all(|l| l.split(',').count() == 13));
    }

    #[test]
    fn deltas_double_the_width() {
        let cli = cli(&["--tone", "300", "--duration", "0.2", "--deltas", "2"]);
        let samples = load_samples(&cli).unwrap();
        let mut out = Vec::new();
        run(&cli, &samples, &MfccConfig::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().all(|l| l.split(',').count() == 26));
    }

    #[test]
    fn summary_reports_peak() {
        let cli = cli(&["--tone", "1000", "--summary"]);
        let samples = load_samples(&cli).unwrap();
        let mut out = Vec::new();
        run(&cli, &samples, &MfccConfig::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("frames,99"));
        assert!(text.contains("peak_hz,1000.0"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let cli = cli(&["--tone", "440"]);
        let samples = load_samples(&cli).unwrap();
        let config = MfccConfig {
            num_coeffs: 30,
            ..MfccConfig::default()
        };
        let err = run(&cli, &samples, &config, &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("30"));
    }

    #[test]
    fn pcm_round_trip_through_a_file() {
        let path = std::env::temp_dir().join(format!("melframes-{}.f32", std::process::id()));
        let bytes: Vec<u8> = [0.25f32, -0.5, 1.0]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        std::fs::write(&path, bytes).unwrap();
        let samples = read_pcm_f32le(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(samples, vec![0.25, -0.5, 1.0]);
    }

    #[test]
    fn missing_source_is_an_error() {
        assert!(load_samples(&cli(&[])).is_err());
    }
}
