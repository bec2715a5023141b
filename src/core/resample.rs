//! Streaming sample-rate conversion used for pitch-only processing.

/// A stateful resampler owned by one channel.
pub trait Resampler: Send {
    /// Resamples `input` into `output` at `ratio` (output rate / input rate).
    ///
    /// State carries over between calls so chunks join without seams. When
    /// `final_chunk` is set, the tail held back for interpolation is flushed.
    /// `output` must hold at least `ceil(input.len() * ratio) + 1` samples.
    /// Returns the number of samples written.
    fn resample(&mut self, input: &[f32], output: &mut [f32], ratio: f64, final_chunk: bool)
        -> usize;

    /// Forgets all carried state.
    fn reset(&mut self);
}

/// Streaming 4-point Hermite interpolator.
///
/// Output for position `p` needs input samples `floor(p) - 1 ..= floor(p) + 2`,
/// so the last two samples of each chunk are held back until the next chunk
/// (or a final flush) provides the right-hand neighbours.
#[derive(Debug, Clone, Default)]
pub struct HermiteResampler {
    /// The last three samples seen, oldest first.
    history: [f32; 3],
    /// Read position relative to the start of the next input chunk.
    pos: f64,
}

impl HermiteResampler {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn sample_at(&self, input: &[f32], idx: isize) -> f32 {
        if idx < 0 {
            self.history[(3 + idx.max(-3)) as usize]
        } else if (idx as usize) < input.len() {
            input[idx as usize]
        } else {
            input.last().copied().unwrap_or(self.history[2])
        }
    }
}

impl Resampler for HermiteResampler {
    fn resample(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        ratio: f64,
        final_chunk: bool,
    ) -> usize {
        if !(ratio.is_finite() && ratio > 0.0) {
            return 0;
        }
        let step = 1.0 / ratio;
        let n = input.len() as isize;
        let mut written = 0;

        while written < output.len() {
            let idx = self.pos.floor() as isize;
            let ready = if final_chunk { idx < n } else { idx + 2 < n };
            if !ready {
                break;
            }
            let frac = (self.pos - idx as f64) as f32;
            let s0 = self.sample_at(input, idx - 1);
            let s1 = self.sample_at(input, idx);
            let s2 = self.sample_at(input, idx + 1);
            let s3 = self.sample_at(input, idx + 2);
            output[written] = hermite(s0, s1, s2, s3, frac);
            written += 1;
            self.pos += step;
        }

        if final_chunk {
            self.reset();
            return written;
        }

        self.pos -= n as f64;
        let keep = input.len().min(3);
        self.history.rotate_left(keep);
        self.history[3 - keep..].copy_from_slice(&input[input.len() - keep..]);
        written
    }

    fn reset(&mut self) {
        self.history = [0.0; 3];
        self.pos = 0.0;
    }
}

/// 4-point Hermite interpolation between `s1` and `s2`.
#[inline]
pub fn hermite(s0: f32, s1: f32, s2: f32, s3: f32, frac: f32) -> f32 {
    let c0 = s1;
    let c1 = 0.5 * (s2 - s0);
    let c2 = s0 - 2.5 * s1 + 2.0 * s2 - 0.5 * s3;
    let c3 = 0.5 * (s3 - s0) + 1.5 * (s1 - s2);
    ((c3 * frac + c2) * frac + c1) * frac + c0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hermite_endpoints() {
        assert_eq!(hermite(0.0, 1.0, 2.0, 3.0, 0.0), 1.0);
        assert!((hermite(0.0, 1.0, 2.0, 3.0, 0.5) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_unity_ratio_passes_through() {
        let mut rs = HermiteResampler::new();
        let input: Vec<f32> = (0..64).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut out = vec![0.0; 80];
        let mut total = Vec::new();
        for chunk in input.chunks(16) {
            let n = rs.resample(chunk, &mut out, 1.0, false);
            total.extend_from_slice(&out[..n]);
        }
        let n = rs.resample(&[], &mut out, 1.0, true);
        total.extend_from_slice(&out[..n]);

        // The final flush releases the two samples held back for interpolation.
        assert_eq!(total.len(), input.len());
        for (a, b) in total.iter().zip(&input) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_upsampling_doubles_length() {
        let mut rs = HermiteResampler::new();
        let input = vec![0.25f32; 100];
        let mut out = vec![0.0; 202];
        let n = rs.resample(&input, &mut out, 2.0, true);
        assert_eq!(n, 200);
        // Interior samples are far enough from the zero history to be flat.
        for &s in &out[4..n] {
            assert!((s - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn test_chunked_matches_single_call() {
        let input: Vec<f32> = (0..300).map(|i| ((i * 13) % 17) as f32 / 17.0).collect();
        let ratio = 0.75;

        let mut whole = HermiteResampler::new();
        let mut single = vec![0.0; 300];
        let n_single = whole.resample(&input, &mut single, ratio, false);

        let mut chunked = HermiteResampler::new();
        let mut out = vec![0.0; 300];
        let mut joined = Vec::new();
        for chunk in input.chunks(37) {
            let n = chunked.resample(chunk, &mut out, ratio, false);
            joined.extend_from_slice(&out[..n]);
        }

        assert_eq!(joined.len(), n_single);
        for (a, b) in joined.iter().zip(&single[..n_single]) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_rejects_bad_ratio() {
        let mut rs = HermiteResampler::new();
        let mut out = [0.0; 8];
        assert_eq!(rs.resample(&[1.0; 4], &mut out, 0.0, false), 0);
        assert_eq!(rs.resample(&[1.0; 4], &mut out, f64::NAN, false), 0);
    }
}
