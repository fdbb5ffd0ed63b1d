//! Triangular Mel filterbank.
//!
//! `num_filters + 2` points equally spaced on the Mel scale between the low and
//! high bounds, quantized to FFT bins with `floor((fft_size + 1) * hz / sample_rate)`.
//! Filter `i` spans points `i..=i + 2` and peaks at point `i + 1`.

use std::collections::HashMap;
use std::sync::Arc;

use mf_core::config::ResolvedConfig;

/// Hz to Mel scale conversion.
#[inline]
#[must_use]
pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Mel to Hz conversion.
#[inline]
#[must_use]
pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// Everything a filterbank depends on. Float bounds are stored as raw bits so the
/// key can be hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterBankKey {
    pub sample_rate: u32,
    pub fft_size: usize,
    pub num_filters: usize,
    low_bits: u32,
    high_bits: u32,
}

impl FilterBankKey {
    #[must_use]
    pub fn new(
        sample_rate: u32,
        fft_size: usize,
        num_filters: usize,
        low_freq_hz: f32,
        high_freq_hz: f32,
    ) -> Self {
        Self {
            sample_rate,
            fft_size,
            num_filters,
            low_bits: low_freq_hz.to_bits(),
            high_bits: high_freq_hz.to_bits(),
        }
    }

    #[must_use]
    pub fn from_resolved(resolved: &ResolvedConfig) -> Self {
        Self::new(
            resolved.sample_rate,
            resolved.fft_size,
            resolved.config.num_filters,
            resolved.low_freq_hz,
            resolved.high_freq_hz,
        )
    }

    #[must_use]
    pub fn low_freq_hz(&self) -> f32 {
        f32::from_bits(self.low_bits)
    }

    #[must_use]
    pub fn high_freq_hz(&self) -> f32 {
        f32::from_bits(self.high_bits)
    }
}

/// One triangular filter. Weights cover `left_bin..=right_bin`; zero elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangularFilter {
    pub left_hz: f32,
    pub center_hz: f32,
    pub right_hz: f32,
    pub left_bin: usize,
    pub center_bin: usize,
    pub right_bin: usize,
    weights: Vec<f32>,
}

impl TriangularFilter {
    fn new(hz: [f32; 3], bins: [usize; 3]) -> Self {
        let [left, center, right] = bins;
        // k < center implies center > left, k > center implies right > center,
        // so neither slope divides by zero. Coincident bins collapse to weight 1.
        let weights = (left..=right)
            .map(|k| match k.cmp(&center) {
                std::cmp::Ordering::Equal => 1.0,
                std::cmp::Ordering::Less => (k - left) as f32 / (center - left) as f32,
                std::cmp::Ordering::Greater => (right - k) as f32 / (right - center) as f32,
            })
            .collect();
        Self {
            left_hz: hz[0],
            center_hz: hz[1],
            right_hz: hz[2],
            left_bin: left,
            center_bin: center,
            right_bin: right,
            weights,
        }
    }

    /// Weights for `left_bin..=right_bin`.
    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weight at spectrum bin `bin`.
    #[must_use]
    pub fn weight(&self, bin: usize) -> f32 {
        bin.checked_sub(self.left_bin)
            .and_then(|i| self.weights.get(i))
            .copied()
            .unwrap_or(0.0)
    }

    /// All three boundaries fall in the same bin.
    #[must_use]
    pub fn is_single_bin(&self) -> bool {
        self.left_bin == self.right_bin
    }

    /// Weighted sum over `values` (one per spectrum bin).
    #[inline]
    #[must_use]
    pub fn apply(&self, values: &[f32]) -> f32 {
        values
            .get(self.left_bin..=self.right_bin)
            .map_or(0.0, |slice| {
                slice.iter().zip(&self.weights).map(|(v, w)| v * w).sum()
            })
    }
}

/// Immutable bank of triangular filters, ordered by center frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBank {
    key: FilterBankKey,
    filters: Vec<TriangularFilter>,
}

impl FilterBank {
    /// Build the bank for `key`. Bounds are expected to be validated already.
    ///
    /// # Example
    /// ```
    /// use mf_dsp::filterbank::{FilterBank, FilterBankKey};
    /// let bank = FilterBank::build(FilterBankKey::new(16000, 320, 26, 300.0, 8000.0));
    /// assert_eq!(bank.len(), 26);
    /// assert_eq!(bank.num_bins(), 161);
    /// ```
    #[must_use]
    pub fn build(key: FilterBankKey) -> Self {
        let num_filters = key.num_filters;
        let last_bin = key.fft_size / 2;
        let mel_low = hz_to_mel(key.low_freq_hz());
        let mel_high = hz_to_mel(key.high_freq_hz());
        let intervals = (num_filters + 1) as f32;

        let hz_points: Vec<f32> = (0..num_filters + 2)
            .map(|i| mel_to_hz(mel_low + (mel_high - mel_low) * i as f32 / intervals))
            .collect();
        let bins: Vec<usize> = hz_points
            .iter()
            .map(|&hz| {
                let bin = ((key.fft_size + 1) as f32 * hz / key.sample_rate as f32).floor();
                (bin.max(0.0) as usize).min(last_bin)
            })
            .collect();

        let filters = (0..num_filters)
            .map(|i| {
                TriangularFilter::new(
                    [hz_points[i], hz_points[i + 1], hz_points[i + 2]],
                    [bins[i], bins[i + 1], bins[i + 2]],
                )
            })
            .collect();

        Self { key, filters }
    }

    #[must_use]
    pub fn key(&self) -> FilterBankKey {
        self.key
    }

    #[must_use]
    pub fn filters(&self) -> &[TriangularFilter] {
        &self.filters
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Number of spectrum bins the bank expects.
    #[must_use]
    pub fn num_bins(&self) -> usize {
        self.key.fft_size / 2 + 1
    }

    /// Index of the filter whose center frequency is nearest `hz`.
    #[must_use]
    pub fn nearest_filter(&self, hz: f32) -> Option<usize> {
        self.filters
            .iter()
            .enumerate()
            .min_by(|a, b| {
                (a.1.center_hz - hz)
                    .abs()
                    .total_cmp(&(b.1.center_hz - hz).abs())
            })
            .map(|(i, _)| i)
    }
}

/// Caller-owned cache of built filterbanks, one per distinct [`FilterBankKey`].
#[derive(Debug, Default)]
pub struct FilterBankCache {
    banks: HashMap<FilterBankKey, Arc<FilterBank>>,
}

impl FilterBankCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared bank for `key`, building it on first use.
    pub fn get_or_build(&mut self, key: FilterBankKey) -> Arc<FilterBank> {
        Arc::clone(self.banks.entry(key).or_insert_with(|| {
            log::info!(
                "Building {} Mel filters ({} - {} Hz, fft {}, {} Hz)",
                key.num_filters,
                key.low_freq_hz(),
                key.high_freq_hz(),
                key.fft_size,
                key.sample_rate
            );
            Arc::new(FilterBank::build(key))
        }))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.banks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speech_bank() -> FilterBank {
        FilterBank::build(FilterBankKey::new(16000, 320, 26, 300.0, 8000.0))
    }

    #[test]
    fn mel_conversion_round_trips() {
        for hz in [0.0f32, 300.0, 1000.0, 8000.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 0.05);
        }
        assert!((hz_to_mel(1000.0) - 1000.0).abs() < 0.5);
    }

    #[test]
    fn speech_bank_centers_non_decreasing() {
        let bank = speech_bank();
        assert_eq!(bank.len(), 26);
        for pair in bank.filters().windows(2) {
            assert!(pair[0].center_hz <= pair[1].center_hz);
            assert!(pair[0].center_bin <= pair[1].center_bin);
            // Neighbours share boundaries.
            assert_eq!(pair[0].center_bin, pair[1].left_bin);
            assert_eq!(pair[0].right_bin, pair[1].center_bin);
        }
        let first = &bank.filters()[0];
        assert!((first.left_hz - 300.0).abs() < 0.01);
        let last = &bank.filters()[25];
        assert!((last.right_hz - 8000.0).abs() < 0.5);
        assert_eq!(last.right_bin, 160);
    }

    #[test]
    fn center_weight_is_one_and_boundaries_zero() {
        for filter in speech_bank().filters() {
            assert!((filter.weight(filter.center_bin) - 1.0).abs() < f32::EPSILON);
            if filter.left_bin < filter.center_bin {
                assert!(filter.weight(filter.left_bin).abs() < f32::EPSILON);
            }
            if filter.center_bin < filter.right_bin {
                assert!(filter.weight(filter.right_bin).abs() < f32::EPSILON);
            }
            assert!(filter.weight(filter.right_bin + 1).abs() < f32::EPSILON);
            if filter.left_bin > 0 {
                assert!(filter.weight(filter.left_bin - 1).abs() < f32::EPSILON);
            }
            assert!(filter.weights().iter().sum::<f32>() > 0.0);
        }
    }

    #[test]
    fn first_filters_match_hand_computed_bins() {
        let bank = speech_bank();
        let f0 = &bank.filters()[0];
        assert_eq!((f0.left_bin, f0.center_bin, f0.right_bin), (6, 7, 9));
        assert_eq!(f0.weights(), &[0.0, 1.0, 0.5, 0.0]);
        let f1 = &bank.filters()[1];
        assert_eq!((f1.left_bin, f1.center_bin, f1.right_bin), (7, 9, 11));
    }

    #[test]
    fn crowded_bank_degenerates_to_single_bins() {
        // 40 filters over 64 bins force coincident boundaries at the low end.
        let bank = FilterBank::build(FilterBankKey::new(8000, 128, 40, 0.0, 4000.0));
        assert_eq!(bank.len(), 40);
        let mut saw_degenerate = false;
        for filter in bank.filters() {
            assert!(filter.weights().iter().all(|w| w.is_finite() && *w >= 0.0));
            assert!((filter.weight(filter.center_bin) - 1.0).abs() < f32::EPSILON);
            assert!(filter.weights().iter().sum::<f32>() > 0.0);
            saw_degenerate |= filter.left_bin == filter.center_bin;
            if filter.is_single_bin() {
                assert_eq!(filter.weights(), &[1.0]);
            }
        }
        assert!(saw_degenerate);
    }

    #[test]
    fn apply_is_a_dot_product_over_support() {
        let bank = speech_bank();
        let f0 = &bank.filters()[0];
        let mut values = vec![0.0f32; 161];
        values[7] = 2.0;
        values[8] = 4.0;
        values[100] = 50.0;
        assert!((f0.apply(&values) - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn nearest_filter_by_center() {
        let bank = speech_bank();
        assert_eq!(bank.nearest_filter(440.0), Some(1));
        assert_eq!(bank.nearest_filter(0.0), Some(0));
        assert_eq!(bank.nearest_filter(20_000.0), Some(25));
    }

    #[test]
    fn cache_reuses_banks_per_key() {
        let mut cache = FilterBankCache::new();
        let key = FilterBankKey::new(16000, 320, 26, 300.0, 8000.0);
        let a = cache.get_or_build(key);
        let b = cache.get_or_build(key);
        assert!(Arc::ptr_eq(&a, &b));
        let c = cache.get_or_build(FilterBankKey::new(22050, 441, 26, 300.0, 10_000.0));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);
    }
}
