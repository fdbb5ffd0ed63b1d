use mf_core::error::ConfigError;
use mf_core::frame::MfccFrame;

/// Regression deltas over a coefficient sequence.
///
/// `d[t] = sum_{n=1..width} n * (c[t+n] - c[t-n]) / (2 * sum n^2)`, with frame indices
/// clamped at both ends.
///
/// # Errors
/// Returns an error if `width` is zero.
///
/// # Example
/// ```
/// use mf_dsp::delta::deltas;
/// let frames = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
/// let d = deltas(&frames, 1).unwrap();
/// assert!((d[1][0] - 1.0).abs() < 1e-6);
/// ```
pub fn deltas(frames: &[MfccFrame], width: usize) -> Result<Vec<MfccFrame>, ConfigError> {
    if width == 0 {
        return Err(ConfigError::InvalidDeltaWidth);
    }
    let Some(last) = frames.len().checked_sub(1) else {
        return Ok(Vec::new());
    };
    let denom = 2.0 * (1..=width).map(|n| (n * n) as f32).sum::<f32>();

    Ok((0..frames.len())
        .map(|t| {
            let mut delta = vec![0.0f32; frames[t].len()];
            for n in 1..=width {
                let ahead = &frames[(t + n).min(last)];
                let behind = &frames[t.saturating_sub(n)];
                for ((d, a), b) in delta.iter_mut().zip(ahead).zip(behind) {
                    *d += n as f32 * (a - b);
                }
            }
            for d in &mut delta {
                *d /= denom;
            }
            delta
        })
        .collect())
}
