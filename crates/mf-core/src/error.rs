use thiserror::Error;

/// Invalid parameter combination, detected before any frame is processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sample rate must be positive")]
    InvalidSampleRate,
    #[error("{name} must be a positive number of seconds, got {seconds}")]
    InvalidDuration { name: &'static str, seconds: f64 },
    #[error("{name} of {seconds}s is shorter than one sample at {sample_rate} Hz")]
    DurationBelowOneSample {
        name: &'static str,
        seconds: f64,
        sample_rate: u32,
    },
    #[error("fft size {fft_size} is smaller than the frame length {frame_len}")]
    FftSizeTooSmall { fft_size: usize, frame_len: usize },
    #[error("pre-emphasis coefficient {0} is outside [0, 1)")]
    InvalidPreEmphasis(f32),
    #[error("filterbank needs at least one filter")]
    NoFilters,
    #[error("invalid filterbank range {low_hz} Hz .. {high_hz} Hz")]
    InvalidFrequencyRange { low_hz: f32, high_hz: f32 },
    #[error("high frequency {high_hz} Hz exceeds the Nyquist frequency {nyquist_hz} Hz")]
    HighFreqAboveNyquist { high_hz: f32, nyquist_hz: f32 },
    #[error("at least one cepstral coefficient must be requested")]
    NoCoefficients,
    #[error(
        "{requested} cepstral coefficients requested, only {available} available from {num_filters} filters"
    )]
    TooManyCoefficients {
        requested: usize,
        available: usize,
        num_filters: usize,
    },
    #[error("delta width must be at least 1")]
    InvalidDeltaWidth,
}
