//! Signal → frames → spectra → log filterbank energies → MFCC.

use std::borrow::Cow;
use std::sync::Arc;

use mf_core::config::{MfccConfig, ResolvedConfig};
use mf_core::frame::{FilterBankEnergies, MfccFrame};
use mf_core::signal::Signal;
use rayon::prelude::*;

use crate::cepstrum::CepstralTransform;
use crate::energy::{log_energies_into, log_frame_energy, to_spectrum_kind};
use crate::error::DspError;
use crate::filterbank::{FilterBank, FilterBankCache, FilterBankKey};
use crate::framer::Framer;
use crate::spectrum::{SpectralAnalyzer, SpectrumScratch};

/// Both per-frame outputs of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameFeatures {
    pub energies: FilterBankEnergies,
    pub mfcc: MfccFrame,
}

struct FrameScratch {
    frame: Vec<f32>,
    values: Vec<f32>,
    spectrum: SpectrumScratch,
}

/// Validated, reusable MFCC pipeline for one sample rate.
///
/// Holds the FFT plan, the shared filterbank and the DCT basis; nothing is mutated
/// by extraction, so one extractor can serve many signals and threads.
///
/// # Example
/// ```
/// use mf_core::config::MfccConfig;
/// use mf_core::signal::Signal;
/// use mf_dsp::MfccExtractor;
///
/// let extractor = MfccExtractor::new(&MfccConfig::default(), 16000).unwrap();
/// let samples = vec![0.0f32; 16000];
/// let mfcc = extractor.extract(&Signal::new(&samples, 16000)).unwrap();
/// assert_eq!(mfcc.len(), 99);
/// assert!(mfcc.iter().all(|frame| frame.len() == 13));
/// ```
pub struct MfccExtractor {
    resolved: ResolvedConfig,
    analyzer: SpectralAnalyzer,
    bank: Arc<FilterBank>,
    cepstrum: CepstralTransform,
}

impl MfccExtractor {
    /// Validate `config` for `sample_rate` and build every stage.
    ///
    /// # Errors
    /// Returns the configuration error, before any signal is touched.
    pub fn new(config: &MfccConfig, sample_rate: u32) -> Result<Self, DspError> {
        let resolved = config.validate(sample_rate)?;
        let bank = Arc::new(FilterBank::build(FilterBankKey::from_resolved(&resolved)));
        Self::assemble(resolved, bank)
    }

    /// Like [`MfccExtractor::new`] but takes the filterbank from `cache`.
    ///
    /// # Errors
    /// Returns the configuration error, before any signal is touched.
    pub fn with_cache(
        config: &MfccConfig,
        sample_rate: u32,
        cache: &mut FilterBankCache,
    ) -> Result<Self, DspError> {
        let resolved = config.validate(sample_rate)?;
        let bank = cache.get_or_build(FilterBankKey::from_resolved(&resolved));
        Self::assemble(resolved, bank)
    }

    fn assemble(resolved: ResolvedConfig, bank: Arc<FilterBank>) -> Result<Self, DspError> {
        let cepstrum = CepstralTransform::new(&resolved.config)?;
        let analyzer = SpectralAnalyzer::new(
            resolved.frame_len,
            resolved.fft_size,
            resolved.config.window,
            resolved.sample_rate,
        );
        log::info!(
            "MFCC extractor: {} Hz, frame {} / step {} samples, fft {}, {} filters, {} coefficients",
            resolved.sample_rate,
            resolved.frame_len,
            resolved.step,
            resolved.fft_size,
            bank.len(),
            cepstrum.num_coeffs()
        );
        Ok(Self {
            resolved,
            analyzer,
            bank,
            cepstrum,
        })
    }

    #[must_use]
    pub fn resolved(&self) -> &ResolvedConfig {
        &self.resolved
    }

    #[must_use]
    pub fn filterbank(&self) -> &Arc<FilterBank> {
        &self.bank
    }

    /// Number of frames a signal of `len` samples produces.
    #[must_use]
    pub fn frame_count(&self, len: usize) -> usize {
        crate::framer::frame_count(len, self.resolved.frame_len, self.resolved.step)
    }

    /// MFCC frames of `signal`, in frame order.
    ///
    /// # Errors
    /// Returns an error if the signal's sample rate differs from the extractor's.
    pub fn extract(&self, signal: &Signal<'_>) -> Result<Vec<MfccFrame>, DspError> {
        Ok(self.analyze(signal)?.into_iter().map(|f| f.mfcc).collect())
    }

    /// Log filterbank energies of `signal`, in frame order.
    ///
    /// # Errors
    /// Returns an error if the signal's sample rate differs from the extractor's.
    pub fn filterbank_energies(
        &self,
        signal: &Signal<'_>,
    ) -> Result<Vec<FilterBankEnergies>, DspError> {
        Ok(self.analyze(signal)?.into_iter().map(|f| f.energies).collect())
    }

    /// Energies and MFCC for every frame of `signal`.
    ///
    /// # Errors
    /// Returns an error if the signal's sample rate differs from the extractor's.
    pub fn analyze(&self, signal: &Signal<'_>) -> Result<Vec<FrameFeatures>, DspError> {
        if signal.sample_rate() != self.resolved.sample_rate {
            return Err(DspError::SampleRateMismatch {
                expected: self.resolved.sample_rate,
                got: signal.sample_rate(),
            });
        }
        if !signal.is_empty() && signal.len() < self.resolved.frame_len {
            log::warn!(
                "Signal of {} samples is shorter than one frame ({}); zero-padding",
                signal.len(),
                self.resolved.frame_len
            );
        }

        let samples = self.pre_emphasize(signal.samples());
        let framer = Framer::new(&samples, self.resolved.frame_len, self.resolved.step);
        let count = framer.frame_count();

        let results: Vec<(FrameFeatures, usize)> = if self.resolved.config.parallel {
            (0..count)
                .into_par_iter()
                .map_init(|| self.scratch(), |scratch, i| self.process_frame(&framer, i, scratch))
                .collect::<Result<_, DspError>>()?
        } else {
            let mut scratch = self.scratch();
            (0..count)
                .map(|i| self.process_frame(&framer, i, &mut scratch))
                .collect::<Result<_, DspError>>()?
        };

        let floored: usize = results.iter().map(|(_, n)| n).sum();
        if floored > 0 {
            log::debug!("{floored} filterbank energies floored across {count} frames");
        }
        Ok(results.into_iter().map(|(features, _)| features).collect())
    }

    fn scratch(&self) -> FrameScratch {
        FrameScratch {
            frame: vec![0.0; self.resolved.frame_len],
            values: Vec::with_capacity(self.analyzer.num_bins()),
            spectrum: self.analyzer.scratch(),
        }
    }

    fn pre_emphasize<'s>(&self, samples: &'s [f32]) -> Cow<'s, [f32]> {
        let alpha = self.resolved.config.pre_emphasis;
        if alpha == 0.0 || samples.is_empty() {
            return Cow::Borrowed(samples);
        }
        let mut out = Vec::with_capacity(samples.len());
        out.push(samples[0]);
        out.extend(samples.windows(2).map(|w| w[1] - alpha * w[0]));
        Cow::Owned(out)
    }

    fn process_frame(
        &self,
        framer: &Framer<'_>,
        index: usize,
        scratch: &mut FrameScratch,
    ) -> Result<(FrameFeatures, usize), DspError> {
        framer.fill(index, &mut scratch.frame);
        self.analyzer
            .magnitudes_into(&scratch.frame, &mut scratch.spectrum, &mut scratch.values)?;
        let frame_energy = log_frame_energy(&scratch.values);
        to_spectrum_kind(&mut scratch.values, self.resolved.config.spectrum_kind);

        let mut energies = Vec::with_capacity(self.bank.len());
        let floored = log_energies_into(&self.bank, &scratch.values, &mut energies)?;
        let mfcc = self.cepstrum.transform(&energies, frame_energy)?;
        Ok((FrameFeatures { energies, mfcc }, floored))
    }
}

/// One-shot entry point: validate `config`, then extract MFCC frames from `signal`.
///
/// # Errors
/// Returns a configuration error before any frame is processed.
///
/// # Example
/// ```
/// use mf_core::config::MfccConfig;
/// use mf_core::signal::Signal;
/// use mf_dsp::extract_mfcc;
///
/// let config = MfccConfig { num_coeffs: 30, ..MfccConfig::default() };
/// let samples = vec![0.0f32; 1600];
/// assert!(extract_mfcc(&Signal::new(&samples, 16000), &config).is_err());
/// ```
pub fn extract_mfcc(signal: &Signal<'_>, config: &MfccConfig) -> Result<Vec<MfccFrame>, DspError> {
    MfccExtractor::new(config, signal.sample_rate())?.extract(signal)
}
