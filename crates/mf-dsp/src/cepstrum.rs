//! DCT-II of log filterbank energies, truncated to the lowest coefficients.

use std::f32::consts::PI;

use mf_core::config::{MfccConfig, ZerothCoefficient};
use mf_core::error::ConfigError;
use mf_core::frame::MfccFrame;

use crate::error::DspError;

/// Precomputed DCT-II rows for the emitted coefficients, with optional liftering.
#[derive(Debug, Clone)]
pub struct CepstralTransform {
    num_filters: usize,
    num_coeffs: usize,
    zeroth: ZerothCoefficient,
    /// Row-major `num_coeffs x num_filters`, lifter and scaling folded in.
    basis: Vec<f32>,
}

impl CepstralTransform {
    /// # Errors
    /// Returns an error if no coefficients are requested or more than the filters
    /// can provide under the 0th coefficient policy.
    ///
    /// # Example
    /// ```
    /// use mf_core::config::MfccConfig;
    /// use mf_dsp::cepstrum::CepstralTransform;
    /// let config = MfccConfig { num_coeffs: 30, ..MfccConfig::default() };
    /// assert!(CepstralTransform::new(&config).is_err());
    /// ```
    pub fn new(config: &MfccConfig) -> Result<Self, ConfigError> {
        let num_filters = config.num_filters;
        let num_coeffs = config.num_coeffs;
        if num_filters == 0 {
            return Err(ConfigError::NoFilters);
        }
        if num_coeffs == 0 {
            return Err(ConfigError::NoCoefficients);
        }
        let available = config.available_coeffs();
        if num_coeffs > available {
            return Err(ConfigError::TooManyCoefficients {
                requested: num_coeffs,
                available,
                num_filters,
            });
        }

        let first = usize::from(config.zeroth == ZerothCoefficient::Drop);
        let n = num_filters as f32;
        let mut basis = Vec::with_capacity(num_coeffs * num_filters);
        for k in first..first + num_coeffs {
            let scale = match (config.ortho_dct, k) {
                (false, _) => 1.0,
                (true, 0) => (1.0 / n).sqrt(),
                (true, _) => (2.0 / n).sqrt(),
            } * lifter_gain(config.lifter, k);
            basis.extend(
                (0..num_filters)
                    .map(|i| scale * (PI * k as f32 * (i as f32 + 0.5) / n).cos()),
            );
        }

        Ok(Self {
            num_filters,
            num_coeffs,
            zeroth: config.zeroth,
            basis,
        })
    }

    #[must_use]
    pub fn num_coeffs(&self) -> usize {
        self.num_coeffs
    }

    /// Cepstral coefficients of one frame. `log_frame_energy` is only used when c0
    /// is replaced by the frame energy.
    ///
    /// # Errors
    /// Returns an error if `log_energies` does not hold one value per filter.
    pub fn transform(
        &self,
        log_energies: &[f32],
        log_frame_energy: f32,
    ) -> Result<MfccFrame, DspError> {
        if log_energies.len() != self.num_filters {
            return Err(DspError::EnergyCountMismatch {
                expected: self.num_filters,
                got: log_energies.len(),
            });
        }
        let mut mfcc: MfccFrame = self
            .basis
            .chunks_exact(self.num_filters)
            .map(|row| row.iter().zip(log_energies).map(|(b, e)| b * e).sum())
            .collect();
        if self.zeroth == ZerothCoefficient::LogEnergy {
            mfcc[0] = log_frame_energy;
        }
        Ok(mfcc)
    }
}

/// Sinusoidal lifter `1 + L/2 * sin(pi * k / L)`; 1 when disabled.
fn lifter_gain(lifter: u32, k: usize) -> f32 {
    if lifter == 0 {
        return 1.0;
    }
    let l = lifter as f32;
    1.0 + (l / 2.0) * (PI * k as f32 / l).sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(num_filters: usize, num_coeffs: usize) -> MfccConfig {
        MfccConfig {
            num_filters,
            num_coeffs,
            ..MfccConfig::default()
        }
    }

    #[test]
    fn constant_energies_only_feed_c0() {
        let dct = CepstralTransform::new(&config(26, 13)).unwrap();
        let mfcc = dct.transform(&[2.0; 26], 0.0).unwrap();
        assert_eq!(mfcc.len(), 13);
        // Orthonormal c0 of a constant vector is value * sqrt(N).
        assert!((mfcc[0] - 2.0 * 26.0f32.sqrt()).abs() < 1e-4);
        assert!(mfcc[1..].iter().all(|c| c.abs() < 1e-4));
    }

    #[test]
    fn unscaled_dct_is_the_plain_cosine_sum() {
        let cfg = MfccConfig {
            ortho_dct: false,
            ..config(4, 4)
        };
        let dct = CepstralTransform::new(&cfg).unwrap();
        let input = [1.0, -1.0, 0.5, 0.25];
        let mfcc = dct.transform(&input, 0.0).unwrap();
        for (k, c) in mfcc.iter().enumerate() {
            let expected: f32 = input
                .iter()
                .enumerate()
                .map(|(n, x)| x * (PI * k as f32 * (n as f32 + 0.5) / 4.0).cos())
                .sum();
            assert!((c - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn drop_policy_shifts_by_one() {
        let keep = CepstralTransform::new(&config(26, 13)).unwrap();
        let drop = CepstralTransform::new(&MfccConfig {
            zeroth: ZerothCoefficient::Drop,
            ..config(26, 13)
        })
        .unwrap();
        let energies: Vec<f32> = (0..26).map(|i| (i as f32 * 0.3).sin()).collect();
        let kept = keep.transform(&energies, 0.0).unwrap();
        let dropped = drop.transform(&energies, 0.0).unwrap();
        assert_eq!(dropped.len(), 13);
        for k in 1..13 {
            assert!((kept[k] - dropped[k - 1]).abs() < 1e-5);
        }
    }

    #[test]
    fn log_energy_replaces_c0() {
        let dct = CepstralTransform::new(&MfccConfig {
            zeroth: ZerothCoefficient::LogEnergy,
            ..config(26, 13)
        })
        .unwrap();
        let mfcc = dct.transform(&[1.0; 26], -3.5).unwrap();
        assert!((mfcc[0] + 3.5).abs() < f32::EPSILON);
    }

    #[test]
    fn lifter_scales_higher_coefficients() {
        let plain = CepstralTransform::new(&config(26, 13)).unwrap();
        let lifted = CepstralTransform::new(&MfccConfig {
            lifter: 22,
            ..config(26, 13)
        })
        .unwrap();
        let energies: Vec<f32> = (0..26).map(|i| (i as f32).cos()).collect();
        let a = plain.transform(&energies, 0.0).unwrap();
        let b = lifted.transform(&energies, 0.0).unwrap();
        assert!((a[0] - b[0]).abs() < 1e-5);
        let gain = 1.0 + 11.0 * (PI * 5.0 / 22.0).sin();
        assert!((a[5] * gain - b[5]).abs() < 1e-3);
    }

    #[test]
    fn wrong_energy_count_is_an_error() {
        let dct = CepstralTransform::new(&config(26, 13)).unwrap();
        assert!(matches!(
            dct.transform(&[0.0; 20], 0.0),
            Err(DspError::EnergyCountMismatch {
                expected: 26,
                got: 20
            })
        ));
    }

    #[test]
    fn rejects_more_coefficients_than_filters() {
        assert_eq!(
            CepstralTransform::new(&config(26, 30)).unwrap_err(),
            ConfigError::TooManyCoefficients {
                requested: 30,
                available: 26,
                num_filters: 26,
            }
        );
        assert_eq!(
            CepstralTransform::new(&config(26, 0)).unwrap_err(),
            ConfigError::NoCoefficients
        );
    }
}
