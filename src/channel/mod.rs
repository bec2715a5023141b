//! Channel-local streaming state and its sub-structures.

pub mod accumulator;
pub mod cache;
pub mod data;
pub mod resampling;
pub mod spectral;

pub use accumulator::SynthesisAccumulator;
pub use cache::TransformCache;
pub use data::{ChannelData, RealTimeState, StreamState};
pub use resampling::ResamplingStage;
pub use spectral::{SpectralArraysMut, SpectralWorkspace};
