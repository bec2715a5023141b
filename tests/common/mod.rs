#![allow(dead_code)]

use std::f32::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use stretch_channel::{Transform, TransformFactory};

/// Transform factory that records how many contexts it created and how many
/// are still alive.
#[derive(Default)]
pub struct MockFactory {
    created: AtomicUsize,
    live: Arc<AtomicUsize>,
}

impl MockFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl TransformFactory for MockFactory {
    fn create(&self, size: usize) -> Box<dyn Transform> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        Box::new(MockTransform {
            size,
            live: Arc::clone(&self.live),
        })
    }
}

struct MockTransform {
    size: usize,
    live: Arc<AtomicUsize>,
}

impl Transform for MockTransform {
    fn size(&self) -> usize {
        self.size
    }

    fn forward_polar(&mut self, input: &[f64], mag: &mut [f64], phase: &mut [f64]) {
        for (i, (m, p)) in mag.iter_mut().zip(phase.iter_mut()).enumerate() {
            *m = input.get(i).copied().unwrap_or(0.0).abs();
            *p = 0.0;
        }
    }

    fn inverse_polar(&mut self, mag: &[f64], _phase: &[f64], output: &mut [f64]) {
        for (i, o) in output.iter_mut().enumerate() {
            *o = mag.get(i).copied().unwrap_or(0.0);
        }
    }
}

impl Drop for MockTransform {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn gen_sine(freq_hz: f32, sr: u32, n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| (2.0 * PI * freq_hz * i as f32 / sr as f32).sin())
        .collect()
}

pub fn hann(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / n as f32).cos())
        .collect()
}

/// Array lengths of the spectral workspace, in a comparable form.
pub fn spectral_lengths(data: &stretch_channel::ChannelData) -> [usize; 7] {
    let ws = &data.spectral;
    [
        ws.mag().len(),
        ws.phase().len(),
        ws.prev_phase().len(),
        ws.unwrapped_phase().len(),
        ws.freq_peak().len(),
        ws.fltbuf().len(),
        ws.dblbuf().len(),
    ]
}
