//! MFCC extraction parameters.
//!
//! Every field has a default, so a TOML file only needs the values it changes:
//!
//! ```toml
//! num_filters = 40
//! window = "hann"
//! zeroth = "log_energy"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper filterbank bound used when `high_freq_hz` is not set (capped at Nyquist).
pub const DEFAULT_HIGH_FREQ_HZ: f32 = 10_000.0;

/// Tapering applied to each frame before the FFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Rectangular,
    #[default]
    Hamming,
    Hann,
}

/// Spectrum the filterbank is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumKind {
    Magnitude,
    #[default]
    Power,
}

/// What happens to the 0th cepstral coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZerothCoefficient {
    /// Emit c0..c(N-1).
    #[default]
    Keep,
    /// Emit c1..cN.
    Drop,
    /// Replace c0 with the log of the total frame energy.
    LogEnergy,
}

/// MFCC pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MfccConfig {
    /// Frame length in seconds.
    pub frame_duration: f64,
    /// Hop between frame starts in seconds.
    pub frame_step: f64,
    pub window: WindowKind,
    /// FFT length in samples. Defaults to the frame length.
    pub fft_size: Option<usize>,
    /// Pre-emphasis coefficient α in `y[n] = x[n] - α·x[n-1]`. 0 disables it.
    pub pre_emphasis: f32,
    pub num_filters: usize,
    pub low_freq_hz: f32,
    /// Defaults to `min(10 kHz, Nyquist)`.
    pub high_freq_hz: Option<f32>,
    pub spectrum_kind: SpectrumKind,
    pub num_coeffs: usize,
    pub zeroth: ZerothCoefficient,
    /// Orthonormal DCT-II scaling. When false the plain cosine sum is used.
    pub ortho_dct: bool,
    /// Sinusoidal lifter length. 0 disables liftering.
    pub lifter: u32,
    /// Map frames on the rayon pool.
    pub parallel: bool,
}

impl Default for MfccConfig {
    fn default() -> Self {
        Self {
            frame_duration: 0.02,
            frame_step: 0.01,
            window: WindowKind::Hamming,
            fft_size: None,
            pre_emphasis: 0.0,
            num_filters: 26,
            low_freq_hz: 300.0,
            high_freq_hz: None,
            spectrum_kind: SpectrumKind::Power,
            num_coeffs: 13,
            zeroth: ZerothCoefficient::Keep,
            ortho_dct: true,
            lifter: 0,
            parallel: false,
        }
    }
}

/// Sample-domain values derived from a validated [`MfccConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub config: MfccConfig,
    pub sample_rate: u32,
    /// Frame length in samples.
    pub frame_len: usize,
    /// Hop in samples.
    pub step: usize,
    pub fft_size: usize,
    pub low_freq_hz: f32,
    pub high_freq_hz: f32,
}

impl ResolvedConfig {
    /// Number of one-sided spectrum bins.
    #[must_use]
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }
}

impl MfccConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns an error if the document is not valid TOML for this schema.
    ///
    /// # Example
    /// ```
    /// use mf_core::config::MfccConfig;
    /// let config = MfccConfig::from_toml_str("num_coeffs = 20").unwrap();
    /// assert_eq!(config.num_coeffs, 20);
    /// assert_eq!(config.num_filters, 26);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid MFCC configuration")
    }

    /// Load a TOML configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("Cannot parse config {}", path.display()))?;
        log::info!("Loaded MFCC config from {}", path.display());
        Ok(config)
    }

    /// Number of coefficients the DCT stage can emit given the 0th coefficient policy.
    #[must_use]
    pub fn available_coeffs(&self) -> usize {
        match self.zeroth {
            ZerothCoefficient::Drop => self.num_filters.saturating_sub(1),
            ZerothCoefficient::Keep | ZerothCoefficient::LogEnergy => self.num_filters,
        }
    }

    /// Check every parameter against `sample_rate` and derive sample-domain sizes.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found.
    ///
    /// # Example
    /// ```
    /// use mf_core::config::MfccConfig;
    /// let resolved = MfccConfig::default().validate(16000).unwrap();
    /// assert_eq!(resolved.frame_len, 320);
    /// assert_eq!(resolved.step, 160);
    /// assert_eq!(resolved.high_freq_hz, 8000.0);
    /// ```
    pub fn validate(&self, sample_rate: u32) -> Result<ResolvedConfig, ConfigError> {
        if sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate);
        }
        let frame_len = seconds_to_samples("frame_duration", self.frame_duration, sample_rate)?;
        let step = seconds_to_samples("frame_step", self.frame_step, sample_rate)?;

        let fft_size = self.fft_size.unwrap_or(frame_len);
        if fft_size < frame_len {
            return Err(ConfigError::FftSizeTooSmall {
                fft_size,
                frame_len,
            });
        }

        if !(0.0..1.0).contains(&self.pre_emphasis) {
            return Err(ConfigError::InvalidPreEmphasis(self.pre_emphasis));
        }

        if self.num_filters == 0 {
            return Err(ConfigError::NoFilters);
        }

        let nyquist_hz = sample_rate as f32 / 2.0;
        let high_freq_hz = match self.high_freq_hz {
            Some(high_hz) if high_hz > nyquist_hz => {
                return Err(ConfigError::HighFreqAboveNyquist {
                    high_hz,
                    nyquist_hz,
                });
            }
            Some(high_hz) => high_hz,
            None => DEFAULT_HIGH_FREQ_HZ.min(nyquist_hz),
        };
        let low_freq_hz = self.low_freq_hz;
        // Negated so NaN bounds fail too.
        if !(low_freq_hz >= 0.0 && low_freq_hz < high_freq_hz) {
            return Err(ConfigError::InvalidFrequencyRange {
                low_hz: low_freq_hz,
                high_hz: high_freq_hz,
            });
        }

        if self.num_coeffs == 0 {
            return Err(ConfigError::NoCoefficients);
        }
        let available = self.available_coeffs();
        if self.num_coeffs > available {
            return Err(ConfigError::TooManyCoefficients {
                requested: self.num_coeffs,
                available,
                num_filters: self.num_filters,
            });
        }

        Ok(ResolvedConfig {
            config: self.clone(),
            sample_rate,
            frame_len,
            step,
            fft_size,
            low_freq_hz,
            high_freq_hz,
        })
    }
}

/// `floor(sample_rate * seconds)`, rejecting anything under one sample.
fn seconds_to_samples(
    name: &'static str,
    seconds: f64,
    sample_rate: u32,
) -> Result<usize, ConfigError> {
    if !(seconds.is_finite() && seconds > 0.0) {
        return Err(ConfigError::InvalidDuration { name, seconds });
    }
    // Nudge before flooring so 0.02 s at 16 kHz is 320 samples, not 319.
    let samples = (seconds * f64::from(sample_rate) + 1e-9).floor() as usize;
    if samples == 0 {
        return Err(ConfigError::DurationBelowOneSample {
            name,
            seconds,
            sample_rate,
        });
    }
    Ok(samples)
}
