use std::f32::consts::PI;

use mf_core::config::WindowKind;

/// Symmetric window of `len` coefficients.
///
/// # Example
/// ```
/// use mf_core::config::WindowKind;
/// use mf_dsp::window::window;
/// let w = window(WindowKind::Hamming, 5);
/// assert!((w[0] - 0.08).abs() < 1e-6);
/// assert!((w[2] - 1.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn window(kind: WindowKind, len: usize) -> Vec<f32> {
    if len <= 1 {
        return vec![1.0; len];
    }
    let denom = (len - 1) as f32;
    (0..len)
        .map(|n| {
            let phase = (2.0 * PI * n as f32 / denom).cos();
            match kind {
                WindowKind::Rectangular => 1.0,
                WindowKind::Hamming => 0.54 - 0.46 * phase,
                WindowKind::Hann => 0.5 - 0.5 * phase,
            }
        })
        .collect()
}
