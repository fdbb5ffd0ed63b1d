/// One log-energy per Mel filter, for a single frame.
pub type FilterBankEnergies = Vec<f32>;

/// The lowest cepstral coefficients of a single frame.
pub type MfccFrame = Vec<f32>;

/// Fixed-length slice of a signal. The tail frame is zero-padded.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Offset of the first sample in the source signal.
    pub start: usize,
    pub samples: Vec<f32>,
}

/// One-sided magnitude spectrum of a frame or a whole signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Normalized |X[k]| for k in 0..=n/2.
    pub magnitudes: Vec<f32>,
    /// Spacing between consecutive bins, in Hz.
    pub bin_hz: f32,
}

impl Spectrum {
    #[must_use]
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Frequency of bin `k` in Hz.
    #[inline]
    #[must_use]
    pub fn frequency(&self, k: usize) -> f32 {
        k as f32 * self.bin_hz
    }

    /// `(frequency_hz, magnitude)` pairs in bin order.
    pub fn bins(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.magnitudes
            .iter()
            .enumerate()
            .map(|(k, &m)| (self.frequency(k), m))
    }

    /// Squared magnitudes.
    #[must_use]
    pub fn power(&self) -> Vec<f32> {
        self.magnitudes.iter().map(|m| m * m).collect()
    }
}
