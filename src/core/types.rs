use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ChannelError, Result};

/// A single audio sample.
pub type Sample = f32;

/// Number of real-transform bins for a block size.
#[inline]
pub fn bin_count(block_size: usize) -> usize {
    block_size / 2 + 1
}

/// Output queue capacity needed so that one synthesis call never overflows.
///
/// The synthesis stage may emit up to one block (or one caller-sized process
/// chunk, whichever is larger) per call; pitch scales above 1.0 stretch that
/// chunk before resampling shrinks it back. The factor of two leaves room for
/// a second chunk while the orchestrator has not yet drained the first.
///
/// # Errors
/// Returns `ChannelError::InvalidPitchScale` if `pitch_scale` is not positive
/// and finite.
pub fn required_outbuf_size(
    block_size: usize,
    max_process_size: usize,
    pitch_scale: f64,
) -> Result<usize> {
    if !pitch_scale.is_finite() || pitch_scale <= 0.0 {
        return Err(ChannelError::InvalidPitchScale(pitch_scale));
    }
    let base = block_size.max(max_process_size) as f64;
    Ok((base * pitch_scale.max(1.0)).ceil() as usize * 2)
}

/// Resample buffer length needed to convert `chunk` input samples at `ratio`.
#[inline]
pub fn required_resample_buffer(chunk: usize, ratio: f64) -> usize {
    (chunk as f64 * ratio.max(0.0)).ceil() as usize + 1
}

/// Operating mode of the engine that owns the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    /// Whole-stream processing where the input length is eventually known.
    #[default]
    Offline,
    /// Live processing with a hop size chosen per call.
    RealTime,
}

/// Settings for the optional post-resampling stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResampleConfig {
    /// Initial length of the resample output buffer.
    pub buffer_size: usize,
}

/// Parameters for building one channel's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Candidate block sizes prepared up front. Empty for fixed-size mode.
    #[serde(default)]
    pub block_sizes: BTreeSet<usize>,
    /// Block size active after construction.
    pub initial_block_size: usize,
    /// Output queue capacity.
    pub outbuf_size: usize,
    #[serde(default)]
    pub mode: ProcessingMode,
    #[serde(default)]
    pub resampling: Option<ResampleConfig>,
}

impl ChannelConfig {
    /// Fixed-size mode: one block size, no other transform prepared.
    pub fn fixed(block_size: usize, outbuf_size: usize) -> Self {
        Self {
            block_sizes: BTreeSet::new(),
            initial_block_size: block_size,
            outbuf_size,
            mode: ProcessingMode::Offline,
            resampling: None,
        }
    }

    /// Multi-size mode: every size in `block_sizes` is prepared up front.
    pub fn multi<I>(block_sizes: I, initial_block_size: usize, outbuf_size: usize) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        Self {
            block_sizes: block_sizes.into_iter().collect(),
            ..Self::fixed(initial_block_size, outbuf_size)
        }
    }

    pub fn with_mode(mut self, mode: ProcessingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable the post-resampling stage with the given buffer length.
    pub fn with_resampling(mut self, buffer_size: usize) -> Self {
        self.resampling = Some(ResampleConfig { buffer_size });
        self
    }

    /// Largest block size this config will ever prepare.
    pub fn max_block_size(&self) -> usize {
        self.block_sizes
            .last()
            .copied()
            .unwrap_or(0)
            .max(self.initial_block_size)
    }

    /// Validate all parameters.
    pub fn validate(&self) -> Result<()> {
        if self.initial_block_size == 0 {
            return Err(ChannelError::InvalidBlockSize(0));
        }
        if self.block_sizes.contains(&0) {
            return Err(ChannelError::InvalidBlockSize(0));
        }
        if !self.block_sizes.is_empty() && !self.block_sizes.contains(&self.initial_block_size) {
            return Err(ChannelError::InitialSizeNotInSet {
                initial: self.initial_block_size,
                sizes: self.block_sizes.iter().copied().collect(),
            });
        }
        if self.outbuf_size == 0 {
            return Err(ChannelError::InvalidOutbufSize(0));
        }
        if let Some(rs) = self.resampling {
            if rs.buffer_size == 0 {
                return Err(ChannelError::InvalidConfig(
                    "resample buffer size must be non-zero".to_string(),
                ));
            }
        }
        Ok(())
    }
}
