//! Post-resampling stage for pitch-only processing.

use log::debug;

use crate::core::resample::Resampler;
use crate::core::types::{required_resample_buffer, Sample};

/// An owned resampler and the buffer it writes into.
pub struct ResamplingStage {
    resampler: Box<dyn Resampler>,
    buffer: Vec<Sample>,
}

impl ResamplingStage {
    pub fn new(resampler: Box<dyn Resampler>, buffer_size: usize) -> Self {
        Self {
            resampler,
            buffer: vec![0.0; buffer_size],
        }
    }

    #[inline]
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer(&self) -> &[Sample] {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut [Sample] {
        &mut self.buffer
    }

    pub fn resampler_mut(&mut self) -> &mut dyn Resampler {
        self.resampler.as_mut()
    }

    /// Grows the buffer to at least `size` samples. Existing content is not
    /// kept. Returns `true` if it reallocated.
    pub fn ensure_capacity(&mut self, size: usize) -> bool {
        if size <= self.buffer.len() {
            return false;
        }
        debug!(
            "growing resample buffer from {} to {} samples",
            self.buffer.len(),
            size
        );
        self.buffer = vec![0.0; size];
        true
    }

    /// Resamples `input` at `ratio` into the stage buffer and returns the
    /// produced samples.
    pub fn process(&mut self, input: &[Sample], ratio: f64, final_chunk: bool) -> &[Sample] {
        self.ensure_capacity(required_resample_buffer(input.len(), ratio));
        let n = self
            .resampler
            .resample(input, &mut self.buffer, ratio, final_chunk);
        &self.buffer[..n]
    }

    pub fn reset(&mut self) {
        self.resampler.reset();
        self.buffer.fill(0.0);
    }
}

impl std::fmt::Debug for ResamplingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResamplingStage")
            .field("buffer_size", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resample::HermiteResampler;

    #[test]
    fn test_ensure_capacity_only_grows() {
        let mut stage = ResamplingStage::new(Box::new(HermiteResampler::new()), 64);
        assert!(!stage.ensure_capacity(32));
        assert_eq!(stage.buffer_size(), 64);
        assert!(stage.ensure_capacity(128));
        assert_eq!(stage.buffer_size(), 128);
    }

    #[test]
    fn test_process_grows_for_large_chunk() {
        let mut stage = ResamplingStage::new(Box::new(HermiteResampler::new()), 16);
        let input = vec![0.5f32; 100];
        let out = stage.process(&input, 2.0, true);
        assert_eq!(out.len(), 200);
        assert!(stage.buffer_size() >= 201);
    }

    #[test]
    fn test_downsampling_halves_length() {
        let mut stage = ResamplingStage::new(Box::new(HermiteResampler::new()), 1024);
        let input = vec![0.0f32; 400];
        let n = stage.process(&input, 0.5, true).len();
        assert_eq!(n, 200);
        assert_eq!(stage.buffer_size(), 1024);
    }
}
