//! Per-block-size analysis arrays.

use crate::core::types::bin_count;

/// Magnitude, phase and scratch arrays for the active block size.
///
/// Storage is reserved for the largest block size the channel has been
/// prepared for, so switching between prepared sizes only changes lengths.
/// Arrays are exposed as slices: their length always follows the block size.
#[derive(Debug, Clone)]
pub struct SpectralWorkspace {
    block_size: usize,
    /// Largest block size the storage has room for.
    block_capacity: usize,
    mag: Vec<f64>,
    phase: Vec<f64>,
    prev_phase: Vec<f64>,
    unwrapped_phase: Vec<f64>,
    freq_peak: Vec<usize>,
    fltbuf: Vec<f32>,
    dblbuf: Vec<f64>,
}

/// Simultaneous mutable view of every workspace array.
pub struct SpectralArraysMut<'a> {
    pub mag: &'a mut [f64],
    pub phase: &'a mut [f64],
    pub prev_phase: &'a mut [f64],
    pub unwrapped_phase: &'a mut [f64],
    pub freq_peak: &'a mut [usize],
    pub fltbuf: &'a mut [f32],
    pub dblbuf: &'a mut [f64],
}

fn sized<T: Copy>(len: usize, cap: usize, fill: T) -> Vec<T> {
    let mut v = Vec::with_capacity(cap);
    v.resize(len, fill);
    v
}

impl SpectralWorkspace {
    /// Creates arrays for `block_size` with room for `block_capacity`.
    pub fn new(block_size: usize, block_capacity: usize) -> Self {
        let block_capacity = block_capacity.max(block_size);
        let bins = bin_count(block_size);
        let cap_bins = bin_count(block_capacity);
        Self {
            block_size,
            block_capacity,
            mag: sized(bins, cap_bins, 0.0),
            phase: sized(bins, cap_bins, 0.0),
            prev_phase: sized(bins, cap_bins, 0.0),
            unwrapped_phase: sized(bins, cap_bins, 0.0),
            freq_peak: sized(bins, cap_bins, 0),
            fltbuf: sized(block_size, block_capacity, 0.0),
            dblbuf: sized(block_size, block_capacity, 0.0),
        }
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn bins(&self) -> usize {
        bin_count(self.block_size)
    }

    #[inline]
    pub fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    /// Switches the arrays to `block_size`, zeroing their contents.
    ///
    /// Returns `true` if storage had to grow.
    pub(crate) fn resize(&mut self, block_size: usize) -> bool {
        let grow = block_size > self.block_capacity;
        if grow {
            let cap_bins = bin_count(block_size);
            for v in [
                &mut self.mag,
                &mut self.phase,
                &mut self.prev_phase,
                &mut self.unwrapped_phase,
            ] {
                v.reserve_exact(cap_bins - v.len());
            }
            self.freq_peak.reserve_exact(cap_bins - self.freq_peak.len());
            self.fltbuf.reserve_exact(block_size - self.fltbuf.len());
            self.dblbuf.reserve_exact(block_size - self.dblbuf.len());
            self.block_capacity = block_size;
        }

        self.block_size = block_size;
        let bins = bin_count(block_size);
        for v in [
            &mut self.mag,
            &mut self.phase,
            &mut self.prev_phase,
            &mut self.unwrapped_phase,
        ] {
            v.clear();
            v.resize(bins, 0.0);
        }
        self.freq_peak.clear();
        self.freq_peak.resize(bins, 0);
        self.fltbuf.clear();
        self.fltbuf.resize(block_size, 0.0);
        self.dblbuf.clear();
        self.dblbuf.resize(block_size, 0.0);
        grow
    }

    /// Zeroes every array without changing sizes.
    pub fn clear(&mut self) {
        self.mag.fill(0.0);
        self.phase.fill(0.0);
        self.prev_phase.fill(0.0);
        self.unwrapped_phase.fill(0.0);
        self.freq_peak.fill(0);
        self.fltbuf.fill(0.0);
        self.dblbuf.fill(0.0);
    }

    /// True when every array length matches the current block size.
    pub fn is_consistent(&self) -> bool {
        let bins = self.bins();
        self.mag.len() == bins
            && self.phase.len() == bins
            && self.prev_phase.len() == bins
            && self.unwrapped_phase.len() == bins
            && self.freq_peak.len() == bins
            && self.fltbuf.len() == self.block_size
            && self.dblbuf.len() == self.block_size
    }

    pub fn mag(&self) -> &[f64] {
        &self.mag
    }

    pub fn mag_mut(&mut self) -> &mut [f64] {
        &mut self.mag
    }

    pub fn phase(&self) -> &[f64] {
        &self.phase
    }

    pub fn phase_mut(&mut self) -> &mut [f64] {
        &mut self.phase
    }

    pub fn prev_phase(&self) -> &[f64] {
        &self.prev_phase
    }

    pub fn prev_phase_mut(&mut self) -> &mut [f64] {
        &mut self.prev_phase
    }

    pub fn unwrapped_phase(&self) -> &[f64] {
        &self.unwrapped_phase
    }

    pub fn unwrapped_phase_mut(&mut self) -> &mut [f64] {
        &mut self.unwrapped_phase
    }

    /// Nearest-peak bin index per bin, used for peak locking.
    pub fn freq_peak(&self) -> &[usize] {
        &self.freq_peak
    }

    pub fn freq_peak_mut(&mut self) -> &mut [usize] {
        &mut self.freq_peak
    }

    pub fn fltbuf(&self) -> &[f32] {
        &self.fltbuf
    }

    pub fn fltbuf_mut(&mut self) -> &mut [f32] {
        &mut self.fltbuf
    }

    pub fn dblbuf(&self) -> &[f64] {
        &self.dblbuf
    }

    pub fn dblbuf_mut(&mut self) -> &mut [f64] {
        &mut self.dblbuf
    }

    /// Borrows every array at once.
    pub fn arrays_mut(&mut self) -> SpectralArraysMut<'_> {
        SpectralArraysMut {
            mag: &mut self.mag,
            phase: &mut self.phase,
            prev_phase: &mut self.prev_phase,
            unwrapped_phase: &mut self.unwrapped_phase,
            freq_peak: &mut self.freq_peak,
            fltbuf: &mut self.fltbuf,
            dblbuf: &mut self.dblbuf,
        }
    }

    /// Storage capacities, in the order mag, phase, prev_phase,
    /// unwrapped_phase, freq_peak, fltbuf, dblbuf.
    pub fn capacities(&self) -> [usize; 7] {
        [
            self.mag.capacity(),
            self.phase.capacity(),
            self.prev_phase.capacity(),
            self.unwrapped_phase.capacity(),
            self.freq_peak.capacity(),
            self.fltbuf.capacity(),
            self.dblbuf.capacity(),
        ]
    }
}
