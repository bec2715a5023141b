//! Overlap-add synthesis accumulator.

use crate::core::fft::WINDOW_SUM_EPSILON;
use crate::core::types::Sample;

/// Overlap-add buffer with a parallel window-energy accumulator.
///
/// Synthesized frames are summed at the head of the buffer. Emitting `n`
/// samples normalizes them by the accumulated window energy and shifts both
/// buffers left by `n`, so the head is always the next sample to emit.
#[derive(Debug, Clone)]
pub struct SynthesisAccumulator {
    accumulator: Vec<Sample>,
    window_accumulator: Vec<Sample>,
    /// Samples at the head that hold valid overlap-added content.
    fill: usize,
}

impl SynthesisAccumulator {
    pub fn new(len: usize) -> Self {
        let mut acc = Self {
            accumulator: vec![0.0; len],
            window_accumulator: vec![0.0; len],
            fill: 0,
        };
        acc.clear();
        acc
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.accumulator.len()
    }

    /// True when no overlap-added samples are pending (`fill == 0`).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fill == 0
    }

    #[inline]
    pub fn fill(&self) -> usize {
        self.fill
    }

    /// Sets the valid-sample count, clamped to the buffer length.
    pub fn set_fill(&mut self, fill: usize) {
        self.fill = fill.min(self.len());
    }

    pub fn accumulator(&self) -> &[Sample] {
        &self.accumulator
    }

    pub fn accumulator_mut(&mut self) -> &mut [Sample] {
        &mut self.accumulator
    }

    pub fn window_accumulator(&self) -> &[Sample] {
        &self.window_accumulator
    }

    pub fn window_accumulator_mut(&mut self) -> &mut [Sample] {
        &mut self.window_accumulator
    }

    /// Adds `frame * window` at the head and `window²` to the window energy.
    ///
    /// Only the part of the frame that fits is added. Returns the number of
    /// samples added.
    pub fn overlap_add(&mut self, frame: &[Sample], window: &[Sample]) -> usize {
        let n = frame.len().min(window.len()).min(self.len());
        for i in 0..n {
            self.accumulator[i] += frame[i] * window[i];
            self.window_accumulator[i] += window[i] * window[i];
        }
        self.fill = self.fill.max(n);
        n
    }

    /// Writes up to `n` normalized samples into `out` and shifts them out of
    /// the accumulator. Returns the number of samples emitted.
    pub fn emit(&mut self, n: usize, out: &mut [Sample]) -> usize {
        let n = n.min(self.fill).min(out.len());
        if n == 0 {
            return 0;
        }
        for (o, (&a, &w)) in out[..n]
            .iter_mut()
            .zip(self.accumulator.iter().zip(&self.window_accumulator))
        {
            *o = if w > WINDOW_SUM_EPSILON { a / w } else { a };
        }

        let len = self.len();
        self.accumulator.copy_within(n.., 0);
        self.accumulator[len - n..].fill(0.0);
        self.window_accumulator.copy_within(n.., 0);
        self.window_accumulator[len - n..].fill(0.0);
        self.fill -= n;
        n
    }

    /// Zeroes both buffers and the fill count.
    ///
    /// The first window slot is set to 1.0 so the opening sample, which is
    /// discarded downstream, is never divided by zero.
    pub fn clear(&mut self) {
        self.accumulator.fill(0.0);
        self.window_accumulator.fill(0.0);
        if let Some(first) = self.window_accumulator.first_mut() {
            *first = 1.0;
        }
        self.fill = 0;
    }

    /// Changes the buffer length, keeping leading content.
    pub(crate) fn resize(&mut self, len: usize) {
        self.accumulator.resize(len, 0.0);
        self.window_accumulator.resize(len, 0.0);
        self.fill = self.fill.min(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_cleared() {
        let acc = SynthesisAccumulator::new(16);
        assert_eq!(acc.len(), 16);
        assert_eq!(acc.fill(), 0);
        assert_eq!(acc.window_accumulator()[0], 1.0);
        assert!(acc.accumulator().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_overlap_add_and_emit_normalizes() {
        let mut acc = SynthesisAccumulator::new(8);
        acc.window_accumulator_mut()[0] = 0.0;
        let window = [0.5f32; 4];
        acc.overlap_add(&[2.0; 4], &window);
        acc.overlap_add(&[2.0; 4], &window);
        assert_eq!(acc.fill(), 4);

        // acc = 2.0, window energy = 0.5
        let mut out = [0.0f32; 2];
        assert_eq!(acc.emit(2, &mut out), 2);
        assert_eq!(out, [4.0, 4.0]);
        assert_eq!(acc.fill(), 2);
        assert_eq!(acc.accumulator()[..3], [2.0, 2.0, 0.0]);
        assert_eq!(acc.accumulator()[6..], [0.0, 0.0]);
    }

    #[test]
    fn test_emit_bounded_by_fill_and_output() {
        let mut acc = SynthesisAccumulator::new(8);
        acc.overlap_add(&[1.0; 3], &[1.0; 3]);
        let mut out = [0.0f32; 8];
        assert_eq!(acc.emit(8, &mut out), 3);
        assert_eq!(acc.fill(), 0);
        assert_eq!(acc.emit(1, &mut out), 0);
    }

    #[test]
    fn test_zero_window_energy_passes_through() {
        let mut acc = SynthesisAccumulator::new(4);
        acc.accumulator_mut()[1] = 0.25;
        acc.set_fill(2);
        let mut out = [0.0f32; 2];
        acc.emit(2, &mut out);
        assert_eq!(out[1], 0.25);
    }

    #[test]
    fn test_frame_longer_than_buffer_is_truncated() {
        let mut acc = SynthesisAccumulator::new(4);
        assert_eq!(acc.overlap_add(&[1.0; 10], &[1.0; 10]), 4);
        assert_eq!(acc.fill(), 4);
    }

    #[test]
    fn test_resize_clamps_fill() {
        let mut acc = SynthesisAccumulator::new(8);
        acc.set_fill(8);
        acc.resize(4);
        assert_eq!(acc.fill(), 4);
        acc.resize(12);
        assert_eq!(acc.len(), 12);
        assert_eq!(acc.fill(), 4);
    }
}
