//! Whole-signal features and the combined per-signal feature set.

use mf_core::config::{MfccConfig, WindowKind};
use mf_core::frame::{FilterBankEnergies, MfccFrame, Spectrum};
use mf_core::signal::Signal;

use crate::error::DspError;
use crate::pipeline::MfccExtractor;
use crate::spectrum::SpectralAnalyzer;

/// Fraction of adjacent sample pairs whose product is negative, over the signal length.
///
/// # Example
/// ```
/// use mf_dsp::features::zero_crossing_rate;
/// assert!((zero_crossing_rate(&[1.0, -1.0, 1.0, -1.0]) - 0.75).abs() < 1e-6);
/// ```
#[must_use]
pub fn zero_crossing_rate(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let crossings = samples.windows(2).filter(|w| w[0] * w[1] < 0.0).count();
    crossings as f32 / samples.len() as f32
}

/// Unwindowed one-sided spectrum of the whole signal, normalized like frame spectra.
///
/// # Errors
/// Returns an error if the FFT fails.
pub fn signal_spectrum(signal: &Signal<'_>) -> Result<Spectrum, DspError> {
    let len = signal.len();
    if len == 0 {
        return Ok(Spectrum {
            magnitudes: Vec::new(),
            bin_hz: 0.0,
        });
    }
    let analyzer = SpectralAnalyzer::new(len, len, WindowKind::Rectangular, signal.sample_rate());
    let mut scratch = analyzer.scratch();
    analyzer.analyze(signal.samples(), &mut scratch)
}

/// Everything computed for one signal.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub duration_secs: f64,
    pub zero_crossing_rate: f32,
    pub spectrum: Spectrum,
    pub filterbank_energies: Vec<FilterBankEnergies>,
    pub mfcc: Vec<MfccFrame>,
}

/// Compute the full [`FeatureSet`] of `signal`.
///
/// # Errors
/// Returns a configuration error before any computation.
///
/// # Example
/// ```
/// use mf_core::config::MfccConfig;
/// use mf_core::signal::Signal;
/// use mf_dsp::features::analyze;
///
/// let samples: Vec<f32> = (0..8000).map(|i| (i as f32 * 0.3).sin()).collect();
/// let features = analyze(&Signal::new(&samples, 8000), &MfccConfig::default()).unwrap();
/// assert_eq!(features.mfcc.len(), features.filterbank_energies.len());
/// assert_eq!(features.spectrum.len(), 4001);
/// ```
pub fn analyze(signal: &Signal<'_>, config: &MfccConfig) -> Result<FeatureSet, DspError> {
    let extractor = MfccExtractor::new(config, signal.sample_rate())?;
    let (filterbank_energies, mfcc) = extractor
        .analyze(signal)?
        .into_iter()
        .map(|f| (f.energies, f.mfcc))
        .unzip();
    Ok(FeatureSet {
        duration_secs: signal.duration_secs(),
        zero_crossing_rate: zero_crossing_rate(signal.samples()),
        spectrum: signal_spectrum(signal)?,
        filterbank_energies,
        mfcc,
    })
}
