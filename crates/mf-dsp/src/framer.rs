//! Overlapping fixed-length framing.
//!
//! Frames start every `step` samples. The last frame is zero-padded so the whole
//! signal is covered; a signal shorter than one frame yields a single padded frame
//! and an empty signal yields none. Every frame starts inside the signal, so a step
//! longer than the frame skips samples rather than emitting empty frames.

use mf_core::frame::Frame;

/// Number of frames produced for a signal of `len` samples.
///
/// # Example
/// ```
/// use mf_dsp::framer::frame_count;
/// assert_eq!(frame_count(16000, 320, 160), 99);
/// assert_eq!(frame_count(16001, 320, 160), 100);
/// assert_eq!(frame_count(10, 320, 160), 1);
/// assert_eq!(frame_count(0, 320, 160), 0);
/// assert_eq!(frame_count(330, 320, 800), 1);
/// ```
#[must_use]
pub fn frame_count(len: usize, frame_len: usize, step: usize) -> usize {
    let frame_len = frame_len.max(1);
    let step = step.max(1);
    if len == 0 {
        0
    } else if len <= frame_len {
        1
    } else {
        // Coverage count, capped so the last start stays below `len`.
        (1 + (len - frame_len).div_ceil(step)).min(len.div_ceil(step))
    }
}

/// Lazy iterator of [`Frame`]s over a sample slice.
///
/// Cloning or calling [`Framer::restart`] starts the sequence over.
#[derive(Debug, Clone)]
pub struct Framer<'a> {
    samples: &'a [f32],
    frame_len: usize,
    step: usize,
    count: usize,
    next: usize,
}

impl<'a> Framer<'a> {
    /// Zero `frame_len` or `step` is clamped to one sample.
    #[must_use]
    pub fn new(samples: &'a [f32], frame_len: usize, step: usize) -> Self {
        let frame_len = frame_len.max(1);
        let step = step.max(1);
        Self {
            samples,
            frame_len,
            step,
            count: frame_count(samples.len(), frame_len, step),
            next: 0,
        }
    }

    #[must_use]
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Total number of frames, independent of iteration progress.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.count
    }

    pub fn restart(&mut self) {
        self.next = 0;
    }

    /// Copy frame `index` into `out`, zero-padding past the end of the signal and
    /// past `frame_len`. Returns the frame's start offset, or `None` if `index` is
    /// out of range.
    pub fn fill(&self, index: usize, out: &mut [f32]) -> Option<usize> {
        if index >= self.count {
            return None;
        }
        let start = index * self.step;
        let end = (start + self.frame_len)
            .min(self.samples.len())
            .min(start + out.len());
        let available = end.saturating_sub(start);
        out[..available].copy_from_slice(&self.samples[start..start + available]);
        out[available..].fill(0.0);
        Some(start)
    }

    /// Random access to frame `index`.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<Frame> {
        let mut samples = vec![0.0; self.frame_len];
        let start = self.fill(index, &mut samples)?;
        Some(Frame { start, samples })
    }
}

impl Iterator for Framer<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let frame = self.frame(self.next)?;
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Framer<'_> {}
