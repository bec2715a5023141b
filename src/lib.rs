#![forbid(unsafe_code)]
//! Per-channel streaming state for a phase-vocoder time stretcher.
//!
//! `stretch-channel` holds everything one audio channel needs between frames:
//! input and output sample queues, spectral analysis arrays, a cache of FFT
//! contexts keyed by block size, an overlap-add accumulator, and an optional
//! resampling stage for pitch-only processing. It does no signal processing
//! of its own; an orchestrator and the analysis/synthesis code drive it.
//!
//! Constructing with every block size the stream may use keeps later
//! reconfiguration allocation-free.
//!
//! # Quick Start
//!
//! ```
//! use std::collections::BTreeSet;
//! use std::sync::Arc;
//! use stretch_channel::{ChannelData, RustFftFactory};
//!
//! let factory = Arc::new(RustFftFactory::new());
//! let sizes: BTreeSet<usize> = [1024, 2048, 4096].into_iter().collect();
//! let mut channel = ChannelData::with_block_sizes(&sizes, 2048, 8192, factory).unwrap();
//!
//! channel.push_input(&[0.0; 2048]);
//! channel.set_block_size(4096).unwrap(); // prepared, no allocation
//! assert_eq!(channel.spectral.bins(), 2049);
//! ```
//!
//! # From a config file
//!
//! ```
//! use std::sync::Arc;
//! use stretch_channel::{ChannelConfig, ChannelData, ProcessingMode, RustFftFactory};
//!
//! let config = ChannelConfig::multi([1024, 2048], 1024, 4096)
//!     .with_mode(ProcessingMode::RealTime)
//!     .with_resampling(4096);
//! let json = config.to_json_string().unwrap();
//!
//! let parsed = ChannelConfig::from_json_str(&json).unwrap();
//! let channel = ChannelData::from_config(&parsed, Arc::new(RustFftFactory::new())).unwrap();
//! assert!(channel.resampling.is_some());
//! ```

pub mod channel;
pub mod core;
pub mod error;

pub use channel::{
    ChannelData, RealTimeState, ResamplingStage, SpectralWorkspace, StreamState,
    SynthesisAccumulator, TransformCache,
};
pub use crate::core::fft::{RustFftFactory, Transform, TransformFactory};
pub use crate::core::resample::{HermiteResampler, Resampler};
pub use crate::core::ring_buffer::RingBuffer;
pub use crate::core::types::{
    bin_count, required_outbuf_size, required_resample_buffer, ChannelConfig, ProcessingMode,
    ResampleConfig, Sample,
};
pub use error::{ChannelError, Result};
