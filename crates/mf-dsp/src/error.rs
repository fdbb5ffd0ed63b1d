use mf_core::error::ConfigError;
use thiserror::Error;

/// Failure of an extraction call.
///
/// Only [`DspError::Config`] and [`DspError::SampleRateMismatch`] are reachable from
/// validated pipelines; both are reported before any frame is processed.
#[derive(Debug, Error)]
pub enum DspError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("signal sample rate {got} Hz does not match extractor sample rate {expected} Hz")]
    SampleRateMismatch { expected: u32, got: u32 },
    #[error("frame of {got} samples does not match analysis length {expected}")]
    FrameLengthMismatch { expected: usize, got: usize },
    #[error("spectrum has {got} bins, filterbank expects {expected}")]
    SpectrumSizeMismatch { expected: usize, got: usize },
    #[error("{got} filterbank energies given, cepstral transform expects {expected}")]
    EnergyCountMismatch { expected: usize, got: usize },
    #[error("FFT failed: {0}")]
    Fft(#[from] realfft::FftError),
}
