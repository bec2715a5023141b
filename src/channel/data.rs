//! Per-channel state container.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, warn};

use crate::channel::accumulator::SynthesisAccumulator;
use crate::channel::cache::TransformCache;
use crate::channel::resampling::ResamplingStage;
use crate::channel::spectral::{SpectralArraysMut, SpectralWorkspace};
use crate::core::fft::{Transform, TransformFactory};
use crate::core::resample::{HermiteResampler, Resampler};
use crate::core::ring_buffer::RingBuffer;
use crate::core::types::{ChannelConfig, ProcessingMode, Sample};
use crate::error::{ChannelError, Result};

/// State that only exists when the engine runs in real-time mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RealTimeState {
    /// Hop size used for the previous frame.
    pub prev_increment: usize,
}

/// Tail-end state of a channel's stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Input may still arrive.
    Active,
    /// No further input; remaining frames are being processed.
    Draining,
    /// Every output sample implied by the input size has been emitted.
    Complete,
}

/// Buffers, spectral workspace, cached transforms and counters for one
/// audio channel.
///
/// The container never drives processing. The orchestrator pushes input,
/// reconfigures block sizes between frames, and pulls output; analysis and
/// synthesis code reads and writes the public buffers directly.
///
/// Only [`ChannelData::set_block_size`] (for sizes not prepared up front),
/// [`ChannelData::set_outbuf_size`] and resample-buffer growth allocate after
/// construction. There is no internal locking.
#[derive(Debug)]
pub struct ChannelData {
    pub inbuf: RingBuffer<Sample>,
    pub outbuf: RingBuffer<Sample>,
    pub spectral: SpectralWorkspace,
    pub synthesis: SynthesisAccumulator,
    pub resampling: Option<ResamplingStage>,
    /// Present only in [`ProcessingMode::RealTime`].
    pub realtime: Option<RealTimeState>,

    /// Frames processed.
    pub block_count: usize,
    /// Samples consumed from the caller.
    pub in_count: usize,
    /// Samples written to the output queue.
    pub out_count: usize,
    /// Total input length, once known.
    pub input_size: Option<usize>,

    pub draining: bool,
    pub output_complete: bool,

    transforms: TransformCache,
}

impl ChannelData {
    /// Fixed-size mode: prepares exactly one block size. The output queue
    /// holds at least one block.
    ///
    /// # Errors
    /// Returns `InvalidBlockSize` or `InvalidOutbufSize` for zero sizes.
    pub fn new(
        block_size: usize,
        outbuf_size: usize,
        factory: Arc<dyn TransformFactory>,
    ) -> Result<Self> {
        Self::construct(&BTreeSet::new(), block_size, outbuf_size, factory)
    }

    /// Multi-size mode: prepares a transform for every size in `block_sizes`
    /// so that later switches among them never allocate.
    ///
    /// `outbuf_size` should be the largest output capacity ever needed. It is
    /// raised to the largest block size if smaller.
    ///
    /// # Errors
    /// Returns `InitialSizeNotInSet` if `initial_block_size` is not in a
    /// non-empty `block_sizes`, or an invalid-size error for zero sizes.
    pub fn with_block_sizes(
        block_sizes: &BTreeSet<usize>,
        initial_block_size: usize,
        outbuf_size: usize,
        factory: Arc<dyn TransformFactory>,
    ) -> Result<Self> {
        if !block_sizes.is_empty() && !block_sizes.contains(&initial_block_size) {
            return Err(ChannelError::InitialSizeNotInSet {
                initial: initial_block_size,
                sizes: block_sizes.iter().copied().collect(),
            });
        }
        Self::construct(block_sizes, initial_block_size, outbuf_size, factory)
    }

    /// Builds a channel from a validated config, including the real-time
    /// state and resampling stage it asks for.
    pub fn from_config(config: &ChannelConfig, factory: Arc<dyn TransformFactory>) -> Result<Self> {
        config.validate()?;
        let mut data = Self::construct(
            &config.block_sizes,
            config.initial_block_size,
            config.outbuf_size,
            factory,
        )?;
        if config.mode == ProcessingMode::RealTime {
            data.realtime = Some(RealTimeState::default());
        }
        if let Some(rs) = config.resampling {
            data.enable_resampling(Box::new(HermiteResampler::new()), rs.buffer_size);
        }
        Ok(data)
    }

    /// Sizes every buffer: storage for the largest candidate size, lengths
    /// for the initial one.
    fn construct(
        block_sizes: &BTreeSet<usize>,
        initial_block_size: usize,
        outbuf_size: usize,
        factory: Arc<dyn TransformFactory>,
    ) -> Result<Self> {
        if initial_block_size == 0 || block_sizes.contains(&0) {
            return Err(ChannelError::InvalidBlockSize(0));
        }
        if outbuf_size == 0 {
            return Err(ChannelError::InvalidOutbufSize(0));
        }

        let max_size = block_sizes
            .last()
            .copied()
            .unwrap_or(0)
            .max(initial_block_size);
        // One emit can produce a whole block, so the output queue must hold it.
        let outbuf_size = outbuf_size.max(max_size);

        debug!(
            "constructing channel data: block sizes {:?}, initial {}, outbuf {}",
            block_sizes, initial_block_size, outbuf_size
        );

        let data = Self {
            inbuf: RingBuffer::with_capacity(max_size),
            outbuf: RingBuffer::with_capacity(outbuf_size),
            spectral: SpectralWorkspace::new(initial_block_size, max_size),
            synthesis: SynthesisAccumulator::new(max_size.max(outbuf_size)),
            resampling: None,
            realtime: None,
            block_count: 0,
            in_count: 0,
            out_count: 0,
            input_size: None,
            draining: false,
            output_complete: false,
            transforms: TransformCache::new(
                factory,
                block_sizes.iter().copied(),
                initial_block_size,
            ),
        };
        data.debug_check_invariants();
        Ok(data)
    }

    /// Current analysis block size.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.transforms.active_size()
    }

    /// Switches the analysis block size.
    ///
    /// A size prepared at construction (or visited before) only rebinds the
    /// active transform and resizes the spectral arrays. Any other size
    /// allocates a new transform, which stays cached. The input and output
    /// queues and the accumulators grow only if they are smaller than
    /// `block_size`.
    ///
    /// Must not be called while an analysis or synthesis call on this
    /// channel is in flight.
    ///
    /// # Errors
    /// Returns `InvalidBlockSize` if `block_size` is zero.
    pub fn set_block_size(&mut self, block_size: usize) -> Result<()> {
        if block_size == 0 {
            return Err(ChannelError::InvalidBlockSize(block_size));
        }
        if block_size == self.block_size() {
            return Ok(());
        }

        self.transforms.activate(block_size);
        if self.spectral.resize(block_size) {
            debug!("spectral workspace grown to block size {}", block_size);
        }
        if block_size > self.inbuf.capacity() {
            debug!(
                "input queue grown from {} to {} samples",
                self.inbuf.capacity(),
                block_size
            );
            self.inbuf = self.inbuf.resized(block_size);
        }
        if block_size > self.outbuf.capacity() {
            debug!(
                "output queue grown from {} to {} samples",
                self.outbuf.capacity(),
                block_size
            );
            self.outbuf = self.outbuf.resized(block_size);
        }
        if block_size > self.synthesis.len() {
            debug!(
                "accumulator grown from {} to {} samples",
                self.synthesis.len(),
                block_size
            );
            self.synthesis.resize(block_size);
        }

        self.debug_check_invariants();
        Ok(())
    }

    /// Reallocates the output queue with capacity exactly `outbuf_size`.
    ///
    /// Unread output beyond the new capacity is discarded, oldest samples
    /// first kept. The accumulators follow the new size but never shrink
    /// below the largest block size.
    ///
    /// # Errors
    /// Returns `InvalidOutbufSize` if `outbuf_size` is zero.
    pub fn set_outbuf_size(&mut self, outbuf_size: usize) -> Result<()> {
        if outbuf_size == 0 {
            return Err(ChannelError::InvalidOutbufSize(outbuf_size));
        }
        let dropped = self.outbuf.len().saturating_sub(outbuf_size);
        debug!(
            "reallocating output queue from {} to {} samples ({} unread samples dropped)",
            self.outbuf.capacity(),
            outbuf_size,
            dropped
        );
        self.outbuf = self.outbuf.resized(outbuf_size);

        let acc_len = outbuf_size.max(self.spectral.block_capacity());
        if acc_len != self.synthesis.len() {
            self.synthesis.resize(acc_len);
        }

        self.debug_check_invariants();
        Ok(())
    }

    /// Returns the channel to its just-constructed state for a new stream
    /// segment. Nothing is allocated or resized and cached transforms are
    /// kept.
    pub fn reset(&mut self) {
        self.inbuf.clear();
        self.outbuf.clear();
        self.spectral.clear();
        self.synthesis.clear();
        if let Some(stage) = &mut self.resampling {
            stage.reset();
        }
        if let Some(rt) = &mut self.realtime {
            rt.prev_increment = 0;
        }
        self.block_count = 0;
        self.in_count = 0;
        self.out_count = 0;
        self.input_size = None;
        self.draining = false;
        self.output_complete = false;
    }

    pub fn state(&self) -> StreamState {
        if self.output_complete {
            StreamState::Complete
        } else if self.draining {
            StreamState::Draining
        } else {
            StreamState::Active
        }
    }

    pub fn mark_draining(&mut self) {
        self.draining = true;
    }

    pub fn mark_output_complete(&mut self) {
        self.output_complete = true;
    }

    /// Records the total input length. The first value for a stream wins.
    pub fn set_input_size(&mut self, size: usize) {
        match self.input_size {
            None => self.input_size = Some(size),
            Some(existing) if existing != size => {
                warn!(
                    "input size already set to {}, ignoring {}",
                    existing, size
                );
            }
            Some(_) => {}
        }
    }

    /// Queues input samples. Returns how many fit; `in_count` grows by that.
    pub fn push_input(&mut self, samples: &[Sample]) -> usize {
        let written = self.inbuf.write(samples);
        self.in_count += written;
        written
    }

    /// Queues synthesized samples. Returns how many fit; `out_count` grows
    /// by that.
    pub fn write_output(&mut self, samples: &[Sample]) -> usize {
        let written = self.outbuf.write(samples);
        self.out_count += written;
        written
    }

    /// Pops synthesized samples for the caller.
    pub fn read_output(&mut self, out: &mut [Sample]) -> usize {
        self.outbuf.read(out)
    }

    pub fn transform(&self) -> &dyn Transform {
        self.transforms.active()
    }

    pub fn transform_mut(&mut self) -> &mut dyn Transform {
        self.transforms.active_mut()
    }

    /// The active transform together with the spectral arrays, for forward
    /// and inverse transforms straight into the workspace.
    pub fn transform_and_spectrum_mut(&mut self) -> (&mut dyn Transform, SpectralArraysMut<'_>) {
        (self.transforms.active_mut(), self.spectral.arrays_mut())
    }

    pub fn transform_cache(&self) -> &TransformCache {
        &self.transforms
    }

    /// Installs a resampling stage, replacing any existing one.
    pub fn enable_resampling(&mut self, resampler: Box<dyn Resampler>, buffer_size: usize) {
        debug!("enabling resampling stage with buffer of {} samples", buffer_size);
        self.resampling = Some(ResamplingStage::new(resampler, buffer_size));
    }

    /// Removes and returns the resampling stage.
    pub fn disable_resampling(&mut self) -> Option<ResamplingStage> {
        self.resampling.take()
    }

    /// Asserts the sizing invariants in debug builds.
    pub fn debug_check_invariants(&self) {
        debug_assert_eq!(self.spectral.block_size(), self.transforms.active_size());
        debug_assert_eq!(self.transforms.active().size(), self.transforms.active_size());
        debug_assert!(self.spectral.is_consistent());
        debug_assert!(self.synthesis.fill() <= self.synthesis.len());
        debug_assert!(self.synthesis.len() >= self.block_size());
    }
}
