//! Core types, sample queues, and the transform and resampler services.

pub mod config_file;
pub mod fft;
pub mod resample;
pub mod ring_buffer;
pub mod types;

pub use config_file::{read_config_json, write_config_json};
pub use fft::{RustFftFactory, Transform, TransformFactory};
pub use resample::{HermiteResampler, Resampler};
pub use ring_buffer::RingBuffer;
pub use types::*;
