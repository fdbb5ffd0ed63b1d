//! Log filterbank energies.

use mf_core::config::SpectrumKind;
use mf_core::frame::{FilterBankEnergies, Spectrum};

use crate::error::DspError;
use crate::filterbank::FilterBank;

/// Substituted for non-positive energies before `ln`, so silence stays finite.
pub const ENERGY_FLOOR: f32 = f32::EPSILON;

/// Floored natural log.
#[inline]
#[must_use]
pub fn floored_ln(energy: f32) -> f32 {
    if energy > 0.0 {
        energy.ln()
    } else {
        ENERGY_FLOOR.ln()
    }
}

/// Replace `magnitudes` in place with the values the filters integrate.
#[inline]
pub fn to_spectrum_kind(magnitudes: &mut [f32], kind: SpectrumKind) {
    if kind == SpectrumKind::Power {
        for m in magnitudes.iter_mut() {
            *m *= *m;
        }
    }
}

/// Write one floored log-energy per filter into `out`.
///
/// Returns how many filters hit the floor.
///
/// # Errors
/// Returns an error if `values` does not have one entry per bank bin.
pub fn log_energies_into(
    bank: &FilterBank,
    values: &[f32],
    out: &mut FilterBankEnergies,
) -> Result<usize, DspError> {
    if values.len() != bank.num_bins() {
        return Err(DspError::SpectrumSizeMismatch {
            expected: bank.num_bins(),
            got: values.len(),
        });
    }
    out.clear();
    let mut floored = 0;
    for filter in bank.filters() {
        let energy = filter.apply(values);
        if energy <= 0.0 {
            floored += 1;
        }
        out.push(floored_ln(energy));
    }
    Ok(floored)
}

/// Log filterbank energies of `spectrum`.
///
/// # Errors
/// Returns an error if the spectrum length does not match the bank.
///
/// # Example
/// ```
/// use mf_core::config::SpectrumKind;
/// use mf_core::frame::Spectrum;
/// use mf_dsp::energy::log_energies;
/// use mf_dsp::filterbank::{FilterBank, FilterBankKey};
///
/// let bank = FilterBank::build(FilterBankKey::new(16000, 320, 26, 300.0, 8000.0));
/// let silence = Spectrum { magnitudes: vec![0.0; 161], bin_hz: 50.0 };
/// let energies = log_energies(&bank, &silence, SpectrumKind::Power).unwrap();
/// assert!(energies.iter().all(|e| e.is_finite()));
/// ```
pub fn log_energies(
    bank: &FilterBank,
    spectrum: &Spectrum,
    kind: SpectrumKind,
) -> Result<FilterBankEnergies, DspError> {
    let mut values = spectrum.magnitudes.clone();
    to_spectrum_kind(&mut values, kind);
    let mut out = Vec::with_capacity(bank.len());
    log_energies_into(bank, &values, &mut out)?;
    Ok(out)
}

/// Floored log of the frame energy (sum of squared magnitudes), used as a
/// replacement c0 whatever spectrum the filters integrate.
#[must_use]
pub fn log_frame_energy(magnitudes: &[f32]) -> f32 {
    floored_ln(magnitudes.iter().map(|m| m * m).sum())
}
