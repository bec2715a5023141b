//! Transform contexts and the factory that produces them.
//!
//! A channel never plans FFTs itself: it asks a [`TransformFactory`] for a
//! ready context of a given size and keeps it for the life of the channel.

use std::sync::Arc;

use parking_lot::Mutex;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Zero-valued complex number, used for FFT buffer initialization.
pub const COMPLEX_ZERO: Complex<f64> = Complex::new(0.0, 0.0);

/// Absolute floor for window sum normalization to prevent division by zero.
pub const WINDOW_SUM_EPSILON: f32 = 1e-6;

/// Precomputed state for repeated real transforms of one fixed size.
///
/// Spectra are exchanged in polar form over `size / 2 + 1` bins.
pub trait Transform: Send {
    /// Number of time-domain samples per transform.
    fn size(&self) -> usize;

    /// Forward transform of `input` (length `size`) into magnitude and phase.
    fn forward_polar(&mut self, input: &[f64], mag: &mut [f64], phase: &mut [f64]);

    /// Inverse transform from magnitude and phase into `output` (length `size`).
    ///
    /// The result is not normalized; callers scale by `1 / size`.
    fn inverse_polar(&mut self, mag: &[f64], phase: &[f64], output: &mut [f64]);
}

/// Creates transform contexts on demand.
///
/// Every call is an allocation; channels call it only on a cache miss.
pub trait TransformFactory: Send + Sync {
    fn create(&self, size: usize) -> Box<dyn Transform>;
}

/// Transform context backed by `rustfft` plans.
pub struct RustFftTransform {
    size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl RustFftTransform {
    fn new(planner: &mut FftPlanner<f64>, size: usize) -> Self {
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        Self {
            size,
            forward,
            inverse,
            buffer: vec![COMPLEX_ZERO; size],
            scratch: vec![COMPLEX_ZERO; scratch_len],
        }
    }
}

impl Transform for RustFftTransform {
    fn size(&self) -> usize {
        self.size
    }

    fn forward_polar(&mut self, input: &[f64], mag: &mut [f64], phase: &mut [f64]) {
        debug_assert_eq!(input.len(), self.size);
        for (slot, &x) in self.buffer.iter_mut().zip(input) {
            *slot = Complex::new(x, 0.0);
        }
        self.forward
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let bins = (self.size / 2 + 1).min(mag.len()).min(phase.len());
        for bin in 0..bins {
            let c = self.buffer[bin];
            mag[bin] = c.norm();
            phase[bin] = c.arg();
        }
    }

    fn inverse_polar(&mut self, mag: &[f64], phase: &[f64], output: &mut [f64]) {
        let bins = self.size / 2 + 1;
        debug_assert!(mag.len() >= bins && phase.len() >= bins);
        for bin in 0..bins {
            self.buffer[bin] = Complex::from_polar(mag[bin], phase[bin]);
        }
        // Mirror negative frequencies so the inverse is real. Even sizes
        // leave the Nyquist bin unpaired.
        for bin in 1..(self.size + 1) / 2 {
            self.buffer[self.size - bin] = self.buffer[bin].conj();
        }
        self.inverse
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        for (out, c) in output.iter_mut().zip(&self.buffer) {
            *out = c.re;
        }
    }
}

/// Default factory. One planner is shared by every channel it serves, so
/// twiddle tables for a size are computed once per stream.
pub struct RustFftFactory {
    planner: Mutex<FftPlanner<f64>>,
}

impl RustFftFactory {
    pub fn new() -> Self {
        Self {
            planner: Mutex::new(FftPlanner::new()),
        }
    }
}

impl Default for RustFftFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformFactory for RustFftFactory {
    fn create(&self, size: usize) -> Box<dyn Transform> {
        let mut planner = self.planner.lock();
        Box::new(RustFftTransform::new(&mut planner, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_forward_finds_sine_bin() {
        let factory = RustFftFactory::new();
        let mut fft = factory.create(256);
        assert_eq!(fft.size(), 256);

        let input: Vec<f64> = (0..256)
            .map(|i| (2.0 * PI * 8.0 * i as f64 / 256.0).sin())
            .collect();
        let mut mag = vec![0.0; 129];
        let mut phase = vec![0.0; 129];
        fft.forward_polar(&input, &mut mag, &mut phase);

        let peak = mag
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 8);
        assert!((mag[8] - 128.0).abs() < 1e-6);
    }

    #[test]
    fn test_inverse_reconstructs_input() {
        let factory = RustFftFactory::new();
        let mut fft = factory.create(64);
        let input: Vec<f64> = (0..64).map(|i| ((i * 7) % 13) as f64 - 6.0).collect();
        let mut mag = vec![0.0; 33];
        let mut phase = vec![0.0; 33];
        fft.forward_polar(&input, &mut mag, &mut phase);

        let mut output = vec![0.0; 64];
        fft.inverse_polar(&mag, &phase, &mut output);
        for (a, b) in input.iter().zip(&output) {
            assert!((a - b / 64.0).abs() < 1e-9, "{} vs {}", a, b / 64.0);
        }
    }

    #[test]
    fn test_inverse_odd_size_on_fresh_context() {
        let factory = RustFftFactory::new();
        let mut fft = factory.create(5);
        let mag = [0.0, 0.0, 1.0];
        let phase = [0.0; 3];
        let mut output = vec![0.0; 5];
        fft.inverse_polar(&mag, &phase, &mut output);
        for (n, &y) in output.iter().enumerate() {
            let expected = 2.0 * (4.0 * PI * n as f64 / 5.0).cos();
            assert!((y - expected).abs() < 1e-9, "sample {}: {} vs {}", n, y, expected);
        }
    }

    #[test]
    fn test_odd_size_round_trip() {
        let factory = RustFftFactory::new();
        let mut fft = factory.create(63);
        let input: Vec<f64> = (0..63).map(|i| ((i * 5) % 11) as f64 - 5.0).collect();
        let mut mag = vec![0.0; 32];
        let mut phase = vec![0.0; 32];
        fft.forward_polar(&input, &mut mag, &mut phase);

        let mut fresh = factory.create(63);
        let mut output = vec![0.0; 63];
        fresh.inverse_polar(&mag, &phase, &mut output);
        for (a, b) in input.iter().zip(&output) {
            assert!((a - b / 63.0).abs() < 1e-9, "{} vs {}", a, b / 63.0);
        }
    }
}
