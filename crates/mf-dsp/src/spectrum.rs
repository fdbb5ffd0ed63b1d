//! Windowed one-sided magnitude spectra via `realfft`.

use std::sync::Arc;

use mf_core::config::WindowKind;
use mf_core::frame::Spectrum;
use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};

use crate::error::DspError;
use crate::window::window;

/// Per-thread FFT buffers. Allocated once, reused for every frame.
pub struct SpectrumScratch {
    input: Vec<f32>,
    output: Vec<Complex<f32>>,
    fft: Vec<Complex<f32>>,
}

/// Forward real FFT plan plus analysis window for frames of a fixed length.
///
/// Magnitudes are divided by the number of output coefficients (`fft_size / 2 + 1`),
/// the same normalization as [`crate::features::signal_spectrum`].
///
/// # Example
/// ```
/// use mf_core::config::WindowKind;
/// use mf_dsp::spectrum::SpectralAnalyzer;
/// let analyzer = SpectralAnalyzer::new(320, 512, WindowKind::Hamming, 16000);
/// assert_eq!(analyzer.num_bins(), 257);
/// ```
pub struct SpectralAnalyzer {
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    fft_size: usize,
    bin_hz: f32,
}

impl SpectralAnalyzer {
    /// Plan an FFT of `fft_size` points for frames of `frame_len` samples.
    /// An `fft_size` below `frame_len` is raised to `frame_len`.
    #[must_use]
    pub fn new(frame_len: usize, fft_size: usize, kind: WindowKind, sample_rate: u32) -> Self {
        let fft_size = fft_size.max(frame_len);
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        let bin_hz = if fft_size == 0 {
            0.0
        } else {
            sample_rate as f32 / fft_size as f32
        };
        Self {
            fft,
            window: window(kind, frame_len),
            fft_size,
            bin_hz,
        }
    }

    #[must_use]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    #[must_use]
    pub fn frame_len(&self) -> usize {
        self.window.len()
    }

    #[must_use]
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    #[must_use]
    pub fn bin_hz(&self) -> f32 {
        self.bin_hz
    }

    #[must_use]
    pub fn scratch(&self) -> SpectrumScratch {
        SpectrumScratch {
            input: self.fft.make_input_vec(),
            output: self.fft.make_output_vec(),
            fft: self.fft.make_scratch_vec(),
        }
    }

    /// Write the normalized magnitudes of `frame` into `out`.
    ///
    /// # Errors
    /// Returns an error if `frame` is not exactly `frame_len` samples long.
    pub fn magnitudes_into(
        &self,
        frame: &[f32],
        scratch: &mut SpectrumScratch,
        out: &mut Vec<f32>,
    ) -> Result<(), DspError> {
        if frame.len() != self.window.len() {
            return Err(DspError::FrameLengthMismatch {
                expected: self.window.len(),
                got: frame.len(),
            });
        }
        out.clear();
        if self.fft_size == 0 {
            return Ok(());
        }

        let (head, tail) = scratch.input.split_at_mut(frame.len());
        for ((dst, &s), &w) in head.iter_mut().zip(frame).zip(&self.window) {
            *dst = s * w;
        }
        tail.fill(0.0);

        self.fft
            .process_with_scratch(&mut scratch.input, &mut scratch.output, &mut scratch.fft)?;

        let norm = scratch.output.len() as f32;
        out.extend(scratch.output.iter().map(|c| c.norm() / norm));
        Ok(())
    }

    /// Spectrum of a single frame.
    ///
    /// # Errors
    /// Returns an error if `frame` is not exactly `frame_len` samples long.
    pub fn analyze(&self, frame: &[f32], scratch: &mut SpectrumScratch) -> Result<Spectrum, DspError> {
        let mut magnitudes = Vec::with_capacity(self.num_bins());
        self.magnitudes_into(frame, scratch, &mut magnitudes)?;
        Ok(Spectrum {
            magnitudes,
            bin_hz: self.bin_hz,
        })
    }
}
